use crate::error::DecodeError;

/// Views `bytes` as UTF-8 text, or returns the offset of the first invalid
/// byte.
pub(crate) fn utf8(bytes: &[u8]) -> Result<&str, usize> {
    if let Ok(str) = simdutf8::basic::from_utf8(bytes) {
        return Ok(str);
    }
    // The fast path does not report where validation failed.
    simdutf8::compat::from_utf8(bytes).map_err(|err| err.valid_up_to())
}

/// Validates the raw input as UTF-8 and views it as text.
///
/// The input is only borrowed; a caller's growable buffer is never touched,
/// whatever spare capacity it has.
pub(crate) fn source_str(data: &[u8]) -> Result<&str, DecodeError> {
    utf8(data).map_err(|offset| {
        let (line, column) = position_of(data, offset);
        DecodeError::Parse {
            line,
            column,
            message: format!("invalid utf-8 encoding at line {line} column {column}"),
        }
    })
}

/// One-based line and column of the byte at `offset`.
fn position_of(data: &[u8], offset: usize) -> (usize, usize) {
    let before = &data[..offset];
    let line_start = memchr::memrchr(b'\n', before).map_or(0, |pos| pos + 1);
    let line = 1 + memchr::memchr_iter(b'\n', before).count();
    (line, offset - line_start + 1)
}
