use daon_work::HashStrategy;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.daon.network";
pub const DEFAULT_VERIFY_URL: &str = "https://verify.daon.network";
pub const DEFAULT_CREATOR: &str = "bulk-protection-tool";
pub const DEFAULT_USER_AGENT: &str = "DAON-Bulk-Protection-Tool/1.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`Client`](crate::Client) needs to talk to the registry.
///
/// Built explicitly and handed to the client; there is no process-wide
/// default client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the registry API, without a trailing slash.
    pub api_url: String,
    /// Base URL of the public verification site.
    pub verify_url: String,
    /// Creator identifier sent with every registration.
    pub creator: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub hash_strategy: HashStrategy,
}

impl ClientConfig {
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            creator: DEFAULT_CREATOR.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            hash_strategy: HashStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig::default().with_api_url("http://localhost:1317/");
        assert_eq!(config.api_url, "http://localhost:1317");
        assert_eq!(config.endpoint("/api/v1/protect"), "http://localhost:1317/api/v1/protect");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint("/api/v1/protect"), "https://api.daon.network/api/v1/protect");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.hash_strategy, HashStrategy::Raw);
    }
}
