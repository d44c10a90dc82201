//! Client library for a spreadsheet-backed HTTP record store.
//!
//! The store is a single table keyed by a `username` column. This crate
//! exposes the three operations the storefront needs:
//!
//! - Searching rows by username
//! - Inserting a new user row
//! - Overwriting individual fields on an existing row
//!
//! # Example
//!
//! ```no_run
//! use record_store::{RecordField, RecordStore, SheetClient, StoreConfig};
//!
//! # async fn example() -> Result<(), record_store::StoreError> {
//! let config = StoreConfig::new("https://sheetdb.example/api/v1/abc123");
//! let client = SheetClient::new(config)?;
//!
//! let rows = client.search_by_username("ada@example.com").await?;
//! if rows.is_empty() {
//!     client.insert_user("ada@example.com", "hunter2").await?;
//! }
//!
//! client
//!     .update_field("ada@example.com", RecordField::Suggestion, "Dark mode please")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use client::SheetClient;
pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::RecordStore;
pub use types::*;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
