//! DAON Config
//!
//! Layered configuration, lowest precedence first:
//! 1. Built-in defaults
//! 2. `config.{toml,yaml,yml,json}` in the user configuration directory
//! 3. A file given explicitly (`--config`)
//! 4. Environment variables prefixed with `DAON_`, using `__` between
//!    section and key (`DAON_API__URL` sets `api.url`)
//!
//! Command-line flags are applied on top of the loaded [`Config`] by the
//! binary. The configuration is passed around explicitly; nothing here is
//! global.

pub mod error;
mod sections;

pub use crate::sections::{ApiConfig, BatchConfig, HashConfig, ImportConfig, ResultsConfig};

use crate::error::{ErrorKind, Result};
use daon_batch::Options as BatchOptions;
use daon_client::{ClientConfig, License, Mode};
use daon_import::ImportOptions;
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "DAON_";
const FILE_STEMS: [&str; 4] = ["config.toml", "config.yaml", "config.yml", "config.json"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub import: ImportConfig,
    pub batch: BatchConfig,
    pub results: ResultsConfig,
    /// License applied when none is given on the command line.
    pub license: License,
    pub hash: HashConfig,
}

impl Config {
    /// Loads every layer, using the platform's configuration directory for
    /// the user-level file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_from(user_config_dir().as_deref(), explicit)
    }

    /// As [`load`](Self::load), with the user-level directory given.
    ///
    /// The result is not validated: apply command-line overrides first, then
    /// call [`validate`](Self::validate).
    pub fn load_from(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(user_dir, explicit)?
            .extract()
            .map_err(|e| ErrorKind::Load(e.to_string()))?;
        tracing::debug!(api = %config.api.url, license = %config.license, "Configuration loaded");
        Ok(config)
    }

    pub fn figment(user_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(dir) = user_dir {
            for stem in FILE_STEMS {
                let path = dir.join(stem);
                if path.is_file() {
                    tracing::trace!(path = %path.display(), "Merging user configuration");
                    figment = merge_file(figment, &path)?;
                }
            }
        }
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            figment = merge_file(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api.url.starts_with("http://") || self.api.url.starts_with("https://")) {
            exn::bail!(ErrorKind::Invalid {
                field: "api.url",
                reason: format!("expected an http(s) URL, got {:?}", self.api.url),
            });
        }
        if self.api.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "api.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.import.fetch_timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "import.fetch_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.import.max_content_bytes == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "import.max_content_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.import.extensions.is_empty() {
            exn::bail!(ErrorKind::Invalid {
                field: "import.extensions",
                reason: "at least one extension is required".to_string(),
            });
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            verify_url: self.api.verify_url.trim_end_matches('/').to_string(),
            creator: self.api.creator.clone(),
            user_agent: self.api.user_agent.clone(),
            timeout: self.api.timeout(),
            hash_strategy: self.hash.strategy,
            ..ClientConfig::default()
        }
        .with_api_url(self.api.url.as_str())
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            limits: self.import.limits(),
            fetch_delay: self.import.fetch_delay(),
            title_heuristic: self.import.title_heuristic,
            merge_categories: self.import.merge_categories,
            extensions: self.import.extensions.iter().map(|ext| ext.trim_start_matches('.').to_lowercase()).collect(),
        }
    }

    pub fn batch_options(&self, mode: Mode) -> BatchOptions {
        BatchOptions {
            license: self.license,
            mode,
            delay: Duration::from_millis(self.batch.delay_ms),
            simulated_latency: Duration::from_millis(self.batch.simulated_latency_ms),
        }
    }
}

/// Per-user configuration directory, if the platform has one.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("network", "daon", "daon-bulk").map(|dirs| dirs.config_dir().to_path_buf())
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}
