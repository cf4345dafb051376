pub(crate) mod dumps;
