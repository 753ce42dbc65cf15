use daon_client::{DEFAULT_API_URL, DEFAULT_CREATOR, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, DEFAULT_VERIFY_URL};
use daon_import::{DEFAULT_EXTENSIONS, DEFAULT_FETCH_DELAY, FETCH_TIMEOUT, TitleHeuristic, USER_AGENT};
use daon_work::{HashStrategy, Limits};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Registry connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub verify_url: String,
    pub timeout_secs: u64,
    /// Creator identifier attached to every registration.
    pub creator: String,
    pub user_agent: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            creator: DEFAULT_CREATOR.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub min_content_chars: usize,
    pub max_content_bytes: usize,
    /// Pause between two page fetches of a URL list.
    pub fetch_delay_ms: u64,
    pub fetch_timeout_secs: u64,
    pub title_heuristic: TitleHeuristic,
    /// Fold syndication categories into the tag list.
    pub merge_categories: bool,
    /// Extensions picked up when importing a directory.
    pub extensions: Vec<String>,
    /// User agent sent when scraping pages.
    pub user_agent: String,
}

impl ImportConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            min_content_chars: self.min_content_chars,
            max_content_bytes: self.max_content_bytes,
        }
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            min_content_chars: Limits::STANDARD.min_content_chars,
            max_content_bytes: Limits::STANDARD.max_content_bytes,
            fetch_delay_ms: millis(DEFAULT_FETCH_DELAY),
            fetch_timeout_secs: FETCH_TIMEOUT.as_secs(),
            title_heuristic: TitleHeuristic::default(),
            merge_categories: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause after each submission except the last.
    pub delay_ms: u64,
    /// Artificial latency of a dry-run submission.
    pub simulated_latency_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: millis(daon_batch::DEFAULT_DELAY),
            simulated_latency_ms: millis(daon_batch::DEFAULT_SIMULATED_LATENCY),
        }
    }
}

/// Where the JSON results file of a run goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub strategy: HashStrategy,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
