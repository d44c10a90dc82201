//! The record store trait.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{RecordField, UserRow};

/// Operations over the remote user table.
///
/// Abstracted to support different backends (the HTTP spreadsheet API,
/// in-memory tables for tests, etc.)
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return every row whose `username` equals `username` exactly.
    ///
    /// An empty vector means no match. Malformed responses also yield an
    /// empty vector rather than an error.
    async fn search_by_username(&self, username: &str) -> Result<Vec<UserRow>, StoreError>;

    /// Insert a new row with the given username and password.
    async fn insert_user(&self, username: &str, password: &str) -> Result<(), StoreError>;

    /// Overwrite a single column on the row keyed by `username`.
    async fn update_field(
        &self,
        username: &str,
        field: RecordField,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Get a human-readable name for this backend.
    fn name(&self) -> &str;
}
