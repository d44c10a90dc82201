//! Error types for storefront operations.

use record_store::StoreError;
use thiserror::Error;

/// Errors returned by `Session::login`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identifier or secret was empty. No request was made.
    #[error("identifier and secret are both required")]
    MissingInput,

    /// The lookup or the sign-up request failed.
    #[error("record store error: {0}")]
    NetworkOrServer(#[from] StoreError),
}

impl AuthError {
    /// Inline message shown on the sign-in form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingInput => "Please enter both email/username and password.",
            AuthError::NetworkOrServer(_) => "An error occurred. Please try again.",
        }
    }
}

/// Errors returned by user record writes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No identity is signed in. No request was made.
    #[error("must be logged in")]
    NotLoggedIn,

    /// No app with this id is in the catalog.
    #[error("unknown app: {id}")]
    UnknownApp { id: String },

    /// The app is already in the user's downloads. No request was made.
    #[error("{name} is already installed")]
    AlreadyInstalled { name: String },

    /// The remote write failed; local state was left unchanged.
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors reading or writing the persisted identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("identity lock poisoned")]
    Poisoned,
}
