//! Static feed loading.
//!
//! The catalog is two JSON arrays (apps and updates) loaded once per session.
//! Each feed fails independently: a broken updates document still leaves the
//! apps usable and vice versa.

use std::path::PathBuf;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::error::{CatalogError, Result};
use crate::models::{App, AppUpdate};

/// Where a feed document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Fetched over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    File(PathBuf),
}

impl FeedSource {
    /// Interpret `location` as a URL when it has an http(s) scheme, otherwise
    /// as a file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            FeedSource::Url(location.to_string())
        } else {
            FeedSource::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Url(url) => f.write_str(url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Locations of the two catalog feeds.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub apps: FeedSource,
    pub updates: FeedSource,
}

impl FeedConfig {
    pub fn new(apps: &str, updates: &str) -> Self {
        Self {
            apps: FeedSource::parse(apps),
            updates: FeedSource::parse(updates),
        }
    }
}

/// The apps and updates for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub apps: Vec<App>,
    pub updates: Vec<AppUpdate>,
}

impl Catalog {
    pub fn new(apps: Vec<App>, updates: Vec<AppUpdate>) -> Self {
        Self { apps, updates }
    }

    /// Whether no apps were loaded.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Look up an app by id.
    pub fn app(&self, id: &str) -> Option<&App> {
        self.apps.iter().find(|app| app.id == id)
    }

    /// Look up an app by exact (case-sensitive) name.
    pub fn app_named(&self, name: &str) -> Option<&App> {
        self.apps.iter().find(|app| app.name == name)
    }
}

/// Load both feeds concurrently with a fresh HTTP client.
///
/// Never fails: a feed that cannot be fetched or parsed is logged and left
/// empty.
pub async fn load(config: &FeedConfig) -> Catalog {
    load_with_client(&Client::new(), config).await
}

/// Load both feeds concurrently using the given HTTP client.
pub async fn load_with_client(http: &Client, config: &FeedConfig) -> Catalog {
    let (apps, updates) = tokio::join!(
        load_feed::<App>(http, &config.apps, "apps"),
        load_feed::<AppUpdate>(http, &config.updates, "updates"),
    );

    info!(
        apps = apps.len(),
        updates = updates.len(),
        "Catalog loaded"
    );
    Catalog { apps, updates }
}

async fn load_feed<T: DeserializeOwned>(http: &Client, source: &FeedSource, kind: &str) -> Vec<T> {
    match fetch_array(http, source).await {
        Ok(items) => decode_items(items, kind),
        Err(e) => {
            error!("Failed to load {} from {}: {}", kind, source, e);
            Vec::new()
        }
    }
}

/// Fetch a feed document and return its top-level array.
pub async fn fetch_array(http: &Client, source: &FeedSource) -> Result<Vec<Value>> {
    debug!("Fetching feed: {}", source);

    let document: Value = match source {
        FeedSource::Url(url) => {
            let response = http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::Status(status.as_u16()));
            }
            response.json().await?
        }
        FeedSource::File(path) => {
            let raw = tokio::fs::read(path).await?;
            serde_json::from_slice(&raw)?
        }
    };

    match document {
        Value::Array(items) => Ok(items),
        _ => Err(CatalogError::NotAnArray),
    }
}

/// Decode feed entries one by one, skipping the ones that do not fit `T`.
pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>, kind: &str) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {} entry #{}: {}", kind, index, e);
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!(
            "Decoded {} of {} {} entries",
            decoded.len(),
            total,
            kind
        );
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feed_source_parse() {
        assert_eq!(
            FeedSource::parse("https://cdn.example/apps.json"),
            FeedSource::Url("https://cdn.example/apps.json".to_string())
        );
        assert_eq!(
            FeedSource::parse("data/apps.json"),
            FeedSource::File(PathBuf::from("data/apps.json"))
        );
    }

    #[test]
    fn test_decode_skips_malformed_updates() {
        let items = vec![
            json!({"id": "u1", "appId": "a1", "version": "1.1"}),
            json!({"id": "u2"}),
            json!(7),
        ];
        let updates: Vec<AppUpdate> = decode_items(items, "updates");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, "u1");
    }

    #[test]
    fn test_catalog_lookup() {
        let app: App = serde_json::from_value(json!({
            "id": "a1", "name": "Foo", "category": "Tools",
            "iconUrl": "", "downloadUrl": ""
        }))
        .unwrap();
        let catalog = Catalog::new(vec![app], Vec::new());

        assert!(catalog.app("a1").is_some());
        assert!(catalog.app_named("Foo").is_some());
        assert!(catalog.app_named("foo").is_none());
        assert!(!catalog.is_empty());
    }
}
