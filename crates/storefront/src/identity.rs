//! Durable storage for the signed-in identity.
//!
//! The identity is a single string kept under one key. Its presence means a
//! user is signed in; there is no signature or expiry.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::IdentityError;

/// Key the identity is stored under.
pub const IDENTITY_KEY: &str = "appStoreUser";

/// The username keying a user's remote record. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Wrap a non-empty identifier.
    pub fn new(identifier: impl Into<String>) -> Option<Self> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            None
        } else {
            Some(Self(identifier))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persists at most one identity string across restarts.
pub trait IdentityStore: Send + Sync {
    /// Read the stored identity, if any.
    fn load(&self) -> Result<Option<String>, IdentityError>;

    /// Store `identity`, replacing any previous value.
    fn save(&self, identity: &str) -> Result<(), IdentityError>;

    /// Remove the stored identity. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), IdentityError>;
}

/// Identity stored in a small JSON file.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/storefront/identity.json`, if the platform has a data dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("storefront").join("identity.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        let mut map = self.read_map()?;
        Ok(map.remove(IDENTITY_KEY).filter(|id| !id.is_empty()))
    }

    fn save(&self, identity: &str) -> Result<(), IdentityError> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(IDENTITY_KEY.to_string(), identity.to_string());
        debug!("Persisting identity to {}", self.path.display());
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), IdentityError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = self.read_map().unwrap_or_default();
        map.remove(IDENTITY_KEY);
        self.write_map(&map)
    }
}

/// Identity kept in memory only; used in tests.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    value: Mutex<Option<String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: &str) -> Self {
        Self {
            value: Mutex::new(Some(identity.to_string())),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<String>, IdentityError> {
        let value = self.value.lock().map_err(|_| IdentityError::Poisoned)?;
        Ok(value.clone())
    }

    fn save(&self, identity: &str) -> Result<(), IdentityError> {
        let mut value = self.value.lock().map_err(|_| IdentityError::Poisoned)?;
        *value = Some(identity.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        let mut value = self.value.lock().map_err(|_| IdentityError::Poisoned)?;
        *value = None;
        Ok(())
    }
}
