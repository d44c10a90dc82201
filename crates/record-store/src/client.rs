//! Spreadsheet API HTTP client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::RecordStore;
use crate::types::{rows_from_value, InsertRequest, NewUser, RecordField, UpdateRequest, UserRow};

/// Client for the spreadsheet-backed user table.
#[derive(Clone)]
pub struct SheetClient {
    http: Client,
    config: StoreConfig,
    request_id: Arc<AtomicU64>,
}

impl SheetClient {
    /// Build a client for the configured table.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StoreError::Http)?;

        Ok(Self::with_http_client(http, config))
    }

    /// Build a client reusing an existing `reqwest::Client`.
    pub fn with_http_client(http: Client, config: StoreConfig) -> Self {
        Self {
            http,
            config,
            request_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Get the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Turn a non-success response into `StoreError::Status`.
    async fn check_status(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecordStore for SheetClient {
    async fn search_by_username(&self, username: &str) -> Result<Vec<UserRow>, StoreError> {
        let id = self.next_id();
        let url = self.config.search_url(username);
        debug!("Search rows (id={}): {}", id, url);

        let response = self.http.get(&url).send().await?;
        let response = Self::check_status(response).await?;
        let body: Value = response.json().await?;

        if !body.is_array() {
            warn!(id, "Search response was not an array, treating as no match");
        }
        Ok(rows_from_value(body))
    }

    async fn insert_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        let id = self.next_id();
        let url = self.config.insert_url();
        debug!("Insert row (id={}) for {}", id, username);

        let rows = [NewUser {
            username: username.to_string(),
            password: password.to_string(),
        }];

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&InsertRequest { data: &rows })
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn update_field(
        &self,
        username: &str,
        field: RecordField,
        value: &str,
    ) -> Result<(), StoreError> {
        let id = self.next_id();
        let url = self.config.update_url(username);
        debug!("Update {} (id={}) for {}", field, id, username);

        let response = self
            .http
            .put(&url)
            .header("Content-Type", "application/json")
            .json(&UpdateRequest::single(field, value))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "SheetClient"
    }
}

impl std::fmt::Debug for SheetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetClient")
            .field("config", &self.config)
            .finish()
    }
}
