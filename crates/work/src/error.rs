//! Work Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A work-model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for work-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A content hash string was not in `sha256:<64 hex>` form.
    #[display("invalid content hash: {_0}")]
    InvalidHash(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A malformed hash is malformed no matter how often you look at it.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidHash("md5:abc".to_string()).to_string(), "invalid content hash: md5:abc");
        assert!(!ErrorKind::InvalidHash(String::new()).is_retryable());
    }
}
