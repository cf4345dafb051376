//! Conversion between a dynamically-typed [`Value`] model and JSON text.
//!
//! ```
//! use dynjson::{DecodeOptions, EncodeOptions, Value};
//!
//! let value = dynjson::decode(br#"{"a": [1.50, 3.0, null]}"#, DecodeOptions::new())?;
//! let mapping = value.as_mapping().unwrap();
//! assert_eq!(
//!     mapping.get(&Value::string("a")),
//!     Some(&Value::Sequence(vec![1.5.into(), 3.into(), Value::keyword("null")]))
//! );
//!
//! let json = dynjson::encode(&value, EncodeOptions::new())?;
//! assert_eq!(json, br#"{"a":[1.5,3,null]}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dump;
mod error;
mod guard;
mod load;
mod options;
mod value;

pub use error::{DecodeError, DepthExceeded, EncodeError};
pub use guard::MAX_DEPTH;
pub use options::{DecodeOptions, EncodeOptions};
pub use value::{Opaque, Table, Text, TextKind, Value};

use crate::{
    dump::dumps::dumps,
    load::{decoder::source_str, loads::loads},
};

/// Parses JSON text into a [`Value`].
///
/// The input is only read. Each nesting level recurses once on the calling
/// thread's stack, up to [`MAX_DEPTH`] levels.
///
/// # Errors
///
/// [`DecodeError::Parse`] for malformed JSON (including invalid UTF-8),
/// [`DecodeError::InvalidKeyType`] for a non-string object key and
/// [`DecodeError::RecursionLimitExceeded`] when nesting exceeds
/// [`MAX_DEPTH`].
pub fn decode(input: &[u8], options: DecodeOptions) -> Result<Value, DecodeError> {
    let result = source_str(input).and_then(|source| loads(source, options));
    match &result {
        Ok(_) => tracing::debug!(bytes = input.len(), "decoded json document"),
        Err(err) => tracing::debug!(bytes = input.len(), error = %err, "json decode failed"),
    }
    result
}

/// Serializes a [`Value`] as JSON into a new buffer.
///
/// # Errors
///
/// See [`encode_into`].
pub fn encode(value: &Value, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut output = Vec::new();
    encode_into(value, options, &mut output)?;
    Ok(output)
}

/// Serializes a [`Value`] as JSON, appending to `output`.
///
/// On error `output` is truncated back to what it held before the call.
///
/// # Errors
///
/// [`EncodeError::UnsupportedType`] for opaque values,
/// [`EncodeError::InvalidKeyType`] for a live mapping key that is not text,
/// [`EncodeError::InvalidUtf8`] for text that is not UTF-8,
/// [`EncodeError::NonFiniteNumber`] for NaN and infinities and
/// [`EncodeError::RecursionLimitExceeded`] when nesting exceeds
/// [`MAX_DEPTH`].
pub fn encode_into(
    value: &Value,
    options: EncodeOptions,
    output: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    let start = output.len();
    match dumps(value, options, output) {
        Ok(()) => {
            tracing::debug!(
                bytes = output.len() - start,
                pretty = options.pretty,
                "encoded json document"
            );
            Ok(())
        }
        Err(err) => {
            tracing::debug!(error = %err, "json encode failed");
            Err(err)
        }
    }
}
