use std::path::Path;
use std::time::Duration;

use chain_tbc::network::TbcNetwork;
use chain_tbc::utxo::SelectionPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bounds on the fetch-merge-refetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Number of fetch attempts, merges included.
    pub max_attempts: u32,
    /// Wait between broadcasting a merge and re-fetching, so the indexer
    /// sees the new output.
    pub merge_delay_ms: u64,
}

impl RetryPolicy {
    pub fn merge_delay(&self) -> Duration {
        Duration::from_millis(self.merge_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            merge_delay_ms: 3_000,
        }
    }
}

/// Explorer client configuration.
///
/// When `base_url` is unset the network's default endpoint is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub network: TbcNetwork,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry: RetryPolicy,
    pub selection: SelectionPolicy,
}

impl ExplorerConfig {
    pub fn new(network: TbcNetwork) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ClientError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ClientError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.retry.max_attempts == 0 {
            return Err(ClientError::Config("retry.max_attempts must be at least 1".into()));
        }
        if let Some(url) = &self.base_url {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| ClientError::Config(format!("invalid base_url {url}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ClientError::Config(format!("base_url is not an http(s) URL: {url}")));
            }
            if parsed.host_str().map_or(true, str::is_empty) {
                return Err(ClientError::Config(format!("base_url has no host: {url}")));
            }
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_base_url())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Full URL of an endpoint path relative to the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url();
        let path = path.trim_start_matches('/');
        if base.ends_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
