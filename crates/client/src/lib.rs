//! DAON Client
//!
//! Registers works with the DAON content registry. A work is identified by
//! the SHA-256 hash of its content; registering it records that hash together
//! with a license and descriptive metadata.
//!
//! ```no_run
//! use daon_client::{Client, ClientConfig, License, Mode};
//! use daon_work::Work;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::http(ClientConfig::default()).map_err(|e| e.to_string())?;
//! let work = Work::builder("My Story", "Once upon a time...").build();
//! let outcome = client.submit(&work, License::LiberationV1, Mode::Live).await;
//! println!("{}", outcome.is_protected());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
pub mod error;
mod license;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod outcome;
mod transport;

pub use crate::client::Client;
pub use crate::config::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_CREATOR, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DEFAULT_VERIFY_URL,
};
pub use crate::license::{EntityType, LiberationCheck, LiberationUseCase, License, UsePurpose, UseType};
#[cfg(feature = "mock")]
pub use crate::mock::{MockTransport, RecordedRequest};
pub use crate::models::{ContentMetadata, ProtectRequest, ProtectResponse, VerificationResult};
pub use crate::outcome::{Mode, Receipt, SubmissionOutcome};
pub use crate::transport::{HttpResponse, HttpTransport, Transport};
