//! DAON Batch
//!
//! Submits works to the registry one at a time, in input order, with a fixed
//! pause between requests. One bad work never aborts the run: submission
//! errors and panics are recorded as failed outcomes and the batch moves on.
//! Cancellation is cooperative and only takes effect between works, so every
//! result gathered before it is kept.

mod phase;
mod process;
mod submit;

pub use crate::phase::Phase;
pub use crate::process::{
    BatchEvent, BatchResult, DEFAULT_DELAY, DEFAULT_SIMULATED_LATENCY, Entry, Options, process, run,
};
pub use crate::submit::Submit;
pub use daon_client::{License, Mode, SubmissionOutcome};
pub use tokio_util::sync::CancellationToken;
