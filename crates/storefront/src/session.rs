//! Sign-in state.
//!
//! Login looks the identifier up in the remote record store and signs the
//! user in if a row exists, creating the row otherwise. The secret is only
//! ever written on sign-up; it is never checked on login.

use std::sync::Arc;

use record_store::RecordStore;
use tracing::{error, info, warn};

use crate::error::AuthError;
use crate::identity::{IdentityStore, UserIdentity};

/// The single signed-in identity for this process, if any.
pub struct Session {
    store: Arc<dyn RecordStore>,
    persistence: Arc<dyn IdentityStore>,
    current: Option<UserIdentity>,
}

impl Session {
    pub fn new(store: Arc<dyn RecordStore>, persistence: Arc<dyn IdentityStore>) -> Self {
        Self {
            store,
            persistence,
            current: None,
        }
    }

    /// The signed-in identity.
    pub fn current(&self) -> Option<&UserIdentity> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// Restore the identity persisted by a previous run.
    ///
    /// An unreadable store is logged and treated as signed out.
    pub fn restore(&mut self) -> Option<UserIdentity> {
        let restored = match self.persistence.load() {
            Ok(stored) => stored.and_then(UserIdentity::new),
            Err(e) => {
                warn!("Failed to read persisted identity: {}", e);
                None
            }
        };
        if let Some(identity) = &restored {
            info!(user = %identity, "Restored session");
        }
        self.current = restored.clone();
        restored
    }

    /// Sign in as `identifier`, signing up first if no row exists.
    pub async fn login(&mut self, identifier: &str, secret: &str) -> Result<UserIdentity, AuthError> {
        if identifier.is_empty() || secret.is_empty() {
            return Err(AuthError::MissingInput);
        }
        let identity = UserIdentity::new(identifier).ok_or(AuthError::MissingInput)?;

        let existing = self.store.search_by_username(identifier).await?;
        if existing.is_empty() {
            self.store.insert_user(identifier, secret).await?;
            info!(user = %identity, "Created account");
        } else {
            info!(user = %identity, "Signed in to existing account");
        }

        if let Err(e) = self.persistence.save(identity.as_str()) {
            error!("Failed to persist identity: {}", e);
        }
        self.current = Some(identity.clone());
        Ok(identity)
    }

    /// Sign out locally. The remote row is not touched.
    pub fn logout(&mut self) {
        if let Err(e) = self.persistence.clear() {
            error!("Failed to clear persisted identity: {}", e);
        }
        if let Some(identity) = self.current.take() {
            info!(user = %identity, "Signed out");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store.name())
            .field("current", &self.current)
            .finish()
    }
}
