use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end a run with a non-zero exit code.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("no source given")]
    MissingSource,
    #[display("could not load configuration")]
    Config,
    #[display("could not read works from {}", _0.display())]
    Import(#[error(not(source))] PathBuf),
    #[display("could not set up the registry client")]
    Client,
    #[display("could not write results to {}: {reason}", path.display())]
    Results { path: PathBuf, reason: String },
    #[display("terminal output failed")]
    Terminal,
}
