/// Flags recognised by [`crate::decode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Object keys become keywords instead of strings.
    pub keyword_keys: bool,
    /// JSON `null` becomes `Nil` instead of the keyword `null`.
    pub null_to_nil: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keyword_keys(mut self, keyword_keys: bool) -> Self {
        self.keyword_keys = keyword_keys;
        self
    }

    #[must_use]
    pub fn null_to_nil(mut self, null_to_nil: bool) -> Self {
        self.null_to_nil = null_to_nil;
        self
    }
}

/// Flags recognised by [`crate::encode`] and [`crate::encode_into`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Two-space indented, one member per line.
    pub pretty: bool,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
