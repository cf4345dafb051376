use thiserror::Error;

/// The recursion guard tripped: a document or value nests deeper than the
/// guard allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("recursed too deeply (limit {limit})")]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Errors produced by [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input is not well-formed JSON. `line` and `column` are one-based;
    /// `message` includes them.
    #[error("decode error: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// An object key that is not a string.
    #[error("decode error: object key must be a str, found {found}")]
    InvalidKeyType { found: &'static str },

    #[error("decode error: {0}")]
    RecursionLimitExceeded(#[from] DepthExceeded),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Errors produced by [`crate::encode`] and [`crate::encode_into`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// The value has no JSON representation.
    #[error("encode error: type not supported: {kind}")]
    UnsupportedType { kind: String },

    /// A mapping key that is not a byte sequence.
    #[error("encode error: object key must be a byte sequence, found {found}")]
    InvalidKeyType { found: String },

    #[error("encode error: {0}")]
    RecursionLimitExceeded(#[from] DepthExceeded),

    #[error("encode error: string contains invalid utf-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("encode error: number {0} cannot be represented in JSON")]
    NonFiniteNumber(f64),

    /// The JSON writer itself failed.
    #[error("encode error: {0}")]
    Write(String),
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Write(err.to_string())
    }
}
