pub(crate) mod decoder;
pub(crate) mod loads;
