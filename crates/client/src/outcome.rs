use daon_work::ContentHash;
use serde::{Serialize, Serializer};

/// Whether submissions reach the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Live,
    /// Hashes are computed and outcomes synthesized; nothing is sent.
    DryRun,
}

impl Mode {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Proof that a work was registered (or would have been, in a dry run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub content_hash: ContentHash,
    pub tx_hash: Option<String>,
    pub verification_url: Option<String>,
    pub simulated: bool,
}

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Protected(Receipt),
    Failed { error: String },
}

impl SubmissionOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed { error: error.into() }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Protected(receipt) => Some(receipt),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Protected(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Flat form written to results files: `success` plus whichever fields apply.
#[derive(Serialize)]
struct OutcomeRecord<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_url: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    simulated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl Serialize for SubmissionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match self {
            Self::Protected(receipt) => OutcomeRecord {
                success: true,
                content_hash: Some(receipt.content_hash.as_str()),
                tx_hash: receipt.tx_hash.as_deref(),
                verification_url: receipt.verification_url.as_deref(),
                simulated: receipt.simulated,
                error: None,
            },
            Self::Failed { error } => OutcomeRecord {
                success: false,
                content_hash: None,
                tx_hash: None,
                verification_url: None,
                simulated: false,
                error: Some(error),
            },
        };
        record.serialize(serializer)
    }
}
