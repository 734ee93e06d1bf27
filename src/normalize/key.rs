//! Composite key decomposition.

use crate::error::{Result, TraceGraphError};

/// Split `key` into its type-code prefix (`prefix_len` characters) and the
/// serial remainder.
///
/// Counts characters, not bytes, so a multi-byte key never splits inside a
/// code point. A key exactly `prefix_len` long yields an empty serial.
pub fn split_composite_key(key: &str, prefix_len: usize) -> Result<(&str, &str)> {
    let boundary = if prefix_len == 0 {
        Some(0)
    } else {
        key.char_indices()
            .nth(prefix_len - 1)
            .map(|(idx, ch)| idx + ch.len_utf8())
    };
    match boundary {
        Some(idx) => Ok(key.split_at(idx)),
        None => Err(TraceGraphError::MalformedCompositeKey {
            key: key.to_string(),
            prefix_len,
        }),
    }
}
