//! Configuration types for record-store.

use std::env;
use std::time::Duration;

use crate::error::StoreError;

/// Default request timeout applied by the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to the record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the table endpoint (e.g., "https://sheetdb.io/api/v1/abc123").
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with the given base URL.
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `RECORD_STORE_URL` | Table endpoint base URL | (required) |
    /// | `RECORD_STORE_TIMEOUT_SECS` | Request timeout in seconds | `30` |
    pub fn from_env() -> Result<Self, StoreError> {
        let base_url = env::var("RECORD_STORE_URL")
            .map_err(|_| StoreError::Config("RECORD_STORE_URL is required".to_string()))?;

        let timeout = match env::var("RECORD_STORE_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| {
                    StoreError::Config(format!("Invalid RECORD_STORE_TIMEOUT_SECS: {}", e))
                })?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(base_url).with_timeout(timeout))
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL for searching rows by username.
    pub fn search_url(&self, username: &str) -> String {
        format!(
            "{}/search?username={}",
            self.base_url,
            urlencoding::encode(username)
        )
    }

    /// URL for inserting rows.
    pub fn insert_url(&self) -> String {
        self.base_url.clone()
    }

    /// URL for updating the row keyed by `username`.
    pub fn update_url(&self, username: &str) -> String {
        format!(
            "{}/username/{}",
            self.base_url,
            urlencoding::encode(username)
        )
    }
}
