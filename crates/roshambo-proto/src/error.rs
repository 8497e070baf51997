//! Wire-level error types.

use thiserror::Error;

/// Convenience alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors produced while encoding or decoding protocol messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// An outbound message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    /// Inbound bytes were not a well-formed tagged record.
    #[error("malformed peer message: {0}")]
    Decode(#[source] serde_json::Error),
}
