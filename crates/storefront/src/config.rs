//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use catalog::FeedConfig;
use record_store::{StoreConfig, StoreError};

use crate::identity::FileIdentityStore;

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Locations of the apps and updates feeds.
    pub feeds: FeedConfig,
    /// Remote record store connection.
    pub store: StoreConfig,
    /// File holding the signed-in identity.
    pub identity_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `STOREFRONT_APPS_FEED` | Apps feed URL or path | `apps.json` |
    /// | `STOREFRONT_UPDATES_FEED` | Updates feed URL or path | `updates.json` |
    /// | `RECORD_STORE_URL` | Record store base URL | (required) |
    /// | `RECORD_STORE_TIMEOUT_SECS` | Request timeout | `30` |
    /// | `STOREFRONT_IDENTITY_PATH` | Identity file | `<data dir>/storefront/identity.json` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let apps = env::var("STOREFRONT_APPS_FEED").unwrap_or_else(|_| "apps.json".to_string());
        let updates =
            env::var("STOREFRONT_UPDATES_FEED").unwrap_or_else(|_| "updates.json".to_string());

        let store = StoreConfig::from_env()?;

        let identity_path = match env::var("STOREFRONT_IDENTITY_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => FileIdentityStore::default_path().ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            feeds: FeedConfig::new(&apps, &updates),
            store,
            identity_path,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("record store configuration: {0}")]
    Store(#[from] StoreError),

    #[error("no data directory found; set STOREFRONT_IDENTITY_PATH")]
    NoDataDir,
}
