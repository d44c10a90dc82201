//! Storefront session, user record sync and view state.
//!
//! This crate ties the catalog to a user's remote record:
//!
//! - [`session`]: sign in, sign up and sign out, with the identity persisted
//!   across restarts by an [`identity::IdentityStore`]
//! - [`sync`]: the user's downloads and feedback, fetched with generation
//!   tags and written back only through confirmed remote writes
//! - [`state`]: the single [`AppState`] owner with its view state and change
//!   notifications
//! - [`cli`]: the command-line front end used by the `storefront` binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use record_store::{SheetClient, StoreConfig};
//! use storefront::identity::FileIdentityStore;
//! use storefront::AppState;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SheetClient::new(StoreConfig::from_env()?)?);
//! let identity = Arc::new(FileIdentityStore::new("identity.json"));
//!
//! let mut state = AppState::new(store, identity);
//! state.set_catalog(catalog::feed::load(&catalog::FeedConfig::new("apps.json", "updates.json")).await).await;
//! state.restore_session().await;
//!
//! state.install("a1").await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod notice;
pub mod session;
pub mod state;
pub mod sync;

pub use config::{Config, ConfigError};
pub use error::{AuthError, IdentityError, SyncError};
pub use identity::UserIdentity;
pub use notice::{Notice, NoticeKind};
pub use session::Session;
pub use state::{AppState, Page, ProfileSection, Screen, StateChange, ViewState};
pub use sync::{FeedbackKind, FeedbackOutcome, FetchResult, PendingFetch, UserState, UserSync};
