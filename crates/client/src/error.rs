//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be built from the configuration.
    #[display("invalid client configuration: {_0}")]
    Config(#[error(not(source))] String),
    /// The request never produced a response (DNS, TLS, timeout...).
    #[display("transport error: {_0}")]
    Transport(#[error(not(source))] String),
    /// The registry answered with a non-2xx status.
    #[display("registry returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The registry answered 2xx with a body that is not the expected JSON.
    #[display("malformed registry response: {_0}")]
    MalformedResponse(#[error(not(source))] String),
    /// The registry answered but reported the submission as unsuccessful.
    #[display("{_0}")]
    Rejected(#[error(not(source))] String),
    #[display("unknown license: {_0}")]
    UnknownLicense(#[error(not(source))] String),
    #[display("could not encode request")]
    Encode,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
