//! Import Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Two scopes share this enum. Source-level kinds ([`ErrorKind::is_fatal`])
//! abort the import of a whole source and reach the CLI. Record-level kinds
//! are raised for a single export record, feed item, URL or file; the parser
//! that raised them logs the error, counts the record as failed and moves on.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An import error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source path does not exist.
    #[display("source not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The source type could not be determined from the path.
    #[display("unsupported source type: {}", _0.display())]
    UnsupportedSource(#[error(not(source))] PathBuf),
    /// The source exists but could not be opened, read or decoded as a whole.
    #[display("could not read source: {}", _0.display())]
    SourceRead(#[error(not(source))] PathBuf),
    /// The structured export parsed, but its top-level shape is unknown.
    #[display("unrecognized export format: {_0}")]
    UnrecognizedShape(#[error(not(source))] &'static str),
    /// The syndication export is not well-formed XML.
    #[display("malformed XML: {_0}")]
    MalformedXml(#[error(not(source))] String),
    /// A single record inside a source is malformed.
    #[display("malformed record: {_0}")]
    Record(#[error(not(source))] String),
    /// A single URL could not be fetched.
    #[display("fetch failed: {_0}")]
    Fetch(#[error(not(source))] String),
    /// A single file is not valid UTF-8 text.
    #[display("not valid UTF-8 text: {}", _0.display())]
    Decode(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if the whole source is unusable (as opposed to a single
    /// record within it).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::UnsupportedSource(_)
                | Self::SourceRead(_)
                | Self::UnrecognizedShape(_)
                | Self::MalformedXml(_)
        )
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
