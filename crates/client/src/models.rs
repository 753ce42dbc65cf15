use daon_work::{ContentHash, Work};
use serde::{Deserialize, Serialize};

use crate::license::License;

/// Descriptive fields registered alongside a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub title: String,
    pub author: Option<String>,
    pub word_count: u64,
    pub url: Option<String>,
    pub published_date: Option<String>,
    pub tags: Vec<String>,
    pub fandoms: Vec<String>,
    pub characters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub original_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl From<&Work> for ContentMetadata {
    fn from(work: &Work) -> Self {
        Self {
            title: work.title().to_string(),
            author: work.author().map(ToString::to_string),
            word_count: work.word_count(),
            url: work.url().map(ToString::to_string),
            published_date: work.published_date().map(ToString::to_string),
            tags: work.tags().to_vec(),
            fandoms: work.fandoms().to_vec(),
            characters: work.characters().to_vec(),
            categories: work.categories().to_vec(),
            original_id: work.original_id().map(ToString::to_string),
            source_file: work.source_file().map(|path| path.display().to_string()),
        }
    }
}

/// Body of `POST /api/v1/protect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectRequest {
    pub content_hash: ContentHash,
    pub creator: String,
    pub license: License,
    pub platform: String,
    pub metadata: ContentMetadata,
}

impl ProtectRequest {
    pub fn new(work: &Work, content_hash: ContentHash, license: License, creator: impl Into<String>) -> Self {
        Self {
            content_hash,
            creator: creator.into(),
            license,
            platform: work.platform().to_string(),
            metadata: ContentMetadata::from(work),
        }
    }
}

/// Registry reply to a protect request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProtectResponse {
    pub success: bool,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub verification_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Registry record for a content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    /// Registration time, in Unix seconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub verification_url: Option<String>,
}

impl VerificationResult {
    /// The registered license, when the registry reports one this client knows.
    pub fn license(&self) -> Option<License> {
        self.license.as_deref().and_then(|name| name.parse().ok())
    }

    pub fn is_liberation_licensed(&self) -> bool {
        self.license().is_some_and(|license| license.is_liberation())
    }
}
