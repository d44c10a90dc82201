//! In-memory record store for tests and offline use.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::StoreError;
use crate::store::RecordStore;
use crate::types::{RecordField, UserRow};

#[derive(Debug, Clone)]
struct StoredRow {
    row: UserRow,
    password: String,
}

/// A record store that keeps rows in memory.
///
/// Counts every call and can be told to fail reads or writes, which makes it
/// useful for asserting how many remote operations a higher-level action
/// issued.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredRow>>,
    searches: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to seed a row.
    pub fn with_row(self, row: UserRow) -> Self {
        self.push(row, "");
        self
    }

    /// Builder method to seed a bare user row.
    pub fn with_user(self, username: &str) -> Self {
        self.with_row(UserRow {
            username: username.to_string(),
            ..Default::default()
        })
    }

    fn push(&self, row: UserRow, password: &str) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.push(StoredRow {
                row,
                password: password.to_string(),
            });
        }
    }

    /// Make every search fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every insert and update fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// First row stored for `username`.
    pub fn row(&self, username: &str) -> Option<UserRow> {
        let rows = self.rows.lock().ok()?;
        rows.iter()
            .find(|stored| stored.row.username == username)
            .map(|stored| stored.row.clone())
    }

    /// Password stored for `username`.
    pub fn password(&self, username: &str) -> Option<String> {
        let rows = self.rows.lock().ok()?;
        rows.iter()
            .find(|stored| stored.row.username == username)
            .map(|stored| stored.password.clone())
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn search_calls(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("row lock poisoned".to_string())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn search_by_username(&self, username: &str) -> Result<Vec<UserRow>, StoreError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("search failed".to_string()));
        }

        let rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        Ok(rows
            .iter()
            .filter(|stored| stored.row.username == username)
            .map(|stored| stored.row.clone())
            .collect())
    }

    async fn insert_user(&self, username: &str, password: &str) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert failed".to_string()));
        }

        debug!("MemoryStore insert {}", username);
        let mut rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        rows.push(StoredRow {
            row: UserRow {
                username: username.to_string(),
                ..Default::default()
            },
            password: password.to_string(),
        });
        Ok(())
    }

    async fn update_field(
        &self,
        username: &str,
        field: RecordField,
        value: &str,
    ) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("update failed".to_string()));
        }

        let mut rows = self.rows.lock().map_err(|_| Self::poisoned())?;
        for stored in rows.iter_mut().filter(|s| s.row.username == username) {
            let cell = match field {
                RecordField::Downloads => &mut stored.row.downloads,
                RecordField::Complaints => &mut stored.row.complaints,
                RecordField::Suggestion => &mut stored.row.suggestion,
            };
            *cell = value.to_string();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MemoryStore"
    }
}
