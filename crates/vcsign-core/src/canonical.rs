//! Canonical bytes for signing input.
//!
//! Documents are serialized with the JSON Canonicalization Scheme
//! (RFC 8785): sorted keys, no insignificant whitespace, fixed number
//! formatting. Two semantically equal JSON values always produce the same
//! bytes.

use serde::Serialize;

use crate::error::CoreError;

/// Serialize `value` to its RFC 8785 canonical form.
pub fn canonicalize(value: &impl Serialize) -> Result<Vec<u8>, CoreError> {
    serde_jcs::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| CoreError::Canonicalization(e.to_string()))
}
