//! User record sync.
//!
//! Keeps the local view of a user's downloads and feedback in step with the
//! remote row. Locally, downloads are an ordered set of app ids; the remote
//! row stores them as comma-joined app names. App names containing a comma
//! cannot round-trip through that encoding.
//!
//! Every fetch carries a generation number. Starting a new fetch (or
//! resetting for a missing identity/catalog) bumps the generation, and a
//! result from an older generation is dropped when applied.

use std::sync::Arc;

use catalog::{projection, App, Catalog};
use record_store::{RecordField, RecordStore, StoreError};
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::identity::UserIdentity;

/// Separator used by the remote `downloads` column.
pub const DOWNLOADS_SEPARATOR: &str = ",";

/// Local copy of one user's mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    /// Downloaded app ids, deduplicated, in insertion order.
    pub downloads: Vec<String>,
    /// Latest complaint text.
    pub complaints: String,
    /// Latest suggestion text.
    pub suggestion: String,
}

impl UserState {
    pub fn is_installed(&self, app_id: &str) -> bool {
        self.downloads.iter().any(|id| id == app_id)
    }

    /// Downloaded apps resolved against the catalog.
    pub fn downloaded_apps<'a>(&self, apps: &'a [App]) -> Vec<&'a App> {
        projection::resolve_ids(apps, &self.downloads)
    }
}

/// Which feedback column a submission overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Complaint,
    Suggestion,
}

impl FeedbackKind {
    pub fn field(self) -> RecordField {
        match self {
            FeedbackKind::Complaint => RecordField::Complaints,
            FeedbackKind::Suggestion => RecordField::Suggestion,
        }
    }
}

/// Result of a feedback submission that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The text was written and cached.
    Submitted,
    /// The text was blank; nothing was sent.
    Skipped,
}

/// Split a remote `downloads` cell into unique, non-empty names, keeping
/// first-seen order.
pub fn parse_downloads(raw: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for name in raw.split(DOWNLOADS_SEPARATOR).filter(|n| !n.is_empty()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Encode apps as the remote `downloads` cell.
pub fn serialize_downloads<'a>(apps: impl IntoIterator<Item = &'a App>) -> String {
    apps.into_iter()
        .map(|app| app.name.as_str())
        .collect::<Vec<_>>()
        .join(DOWNLOADS_SEPARATOR)
}

/// Fetch and resolve the state for `identity`.
///
/// No matching row yields empty state. When several rows match, the first
/// one wins. Downloaded names are matched against app names exactly; names
/// missing from the catalog are dropped. The result follows catalog order.
pub async fn fetch_user_state(
    store: &dyn RecordStore,
    identity: &UserIdentity,
    apps: &[App],
) -> Result<UserState, StoreError> {
    let rows = store.search_by_username(identity.as_str()).await?;
    let Some(row) = rows.into_iter().next() else {
        debug!(user = %identity, "No remote record, using empty state");
        return Ok(UserState::default());
    };

    let names = parse_downloads(&row.downloads);
    let downloads: Vec<String> = apps
        .iter()
        .filter(|app| names.contains(&app.name.as_str()))
        .map(|app| app.id.clone())
        .collect();

    if downloads.len() < names.len() {
        warn!(
            user = %identity,
            "{} downloaded app(s) not found in catalog",
            names.len() - downloads.len()
        );
    }

    Ok(UserState {
        downloads,
        complaints: row.complaints,
        suggestion: row.suggestion,
    })
}

/// A fetch that has been started but not yet applied.
pub struct PendingFetch {
    generation: u64,
    store: Arc<dyn RecordStore>,
    identity: UserIdentity,
    catalog: Arc<Catalog>,
}

impl PendingFetch {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Perform the remote lookup.
    pub async fn run(self) -> FetchResult {
        let result = fetch_user_state(self.store.as_ref(), &self.identity, &self.catalog.apps).await;
        FetchResult {
            generation: self.generation,
            identity: self.identity,
            result,
        }
    }
}

/// Outcome of a [`PendingFetch`], tagged with its generation.
pub struct FetchResult {
    generation: u64,
    identity: UserIdentity,
    result: Result<UserState, StoreError>,
}

impl FetchResult {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owner of the local user state.
pub struct UserSync {
    store: Arc<dyn RecordStore>,
    state: UserState,
    generation: u64,
}

impl UserSync {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            state: UserState::default(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &UserState {
        &self.state
    }

    /// Generation of the most recent trigger.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin a fetch for a changed identity or catalog.
    ///
    /// Without an identity or with an empty catalog the local state is reset
    /// to empty and no fetch is started. Either way, any fetch already in
    /// flight becomes stale.
    pub fn start_fetch(
        &mut self,
        identity: Option<&UserIdentity>,
        catalog: &Arc<Catalog>,
    ) -> Option<PendingFetch> {
        self.generation += 1;

        let identity = match identity {
            Some(identity) if !catalog.is_empty() => identity.clone(),
            _ => {
                self.state = UserState::default();
                return None;
            }
        };

        debug!(user = %identity, generation = self.generation, "Starting user fetch");
        Some(PendingFetch {
            generation: self.generation,
            store: Arc::clone(&self.store),
            identity,
            catalog: Arc::clone(catalog),
        })
    }

    /// Apply a finished fetch. Returns false if it was stale and dropped.
    ///
    /// A failed fetch resets the state to empty.
    pub fn apply(&mut self, fetched: FetchResult) -> bool {
        if fetched.generation != self.generation {
            debug!(
                stale = fetched.generation,
                current = self.generation,
                "Dropping stale user fetch"
            );
            return false;
        }

        self.state = match fetched.result {
            Ok(state) => {
                info!(
                    user = %fetched.identity,
                    downloads = state.downloads.len(),
                    "User state loaded"
                );
                state
            }
            Err(e) => {
                error!(user = %fetched.identity, "Failed to fetch user data: {}", e);
                UserState::default()
            }
        };
        true
    }

    /// Start, run and apply a fetch in one step.
    pub async fn refresh(&mut self, identity: Option<&UserIdentity>, catalog: &Arc<Catalog>) {
        if let Some(pending) = self.start_fetch(identity, catalog) {
            let fetched = pending.run().await;
            self.apply(fetched);
        }
    }

    /// Record that `identity` installed `app`.
    ///
    /// Local state changes only after the remote write succeeds.
    pub async fn record_download(
        &mut self,
        identity: Option<&UserIdentity>,
        app: &App,
        catalog: &Catalog,
    ) -> Result<(), SyncError> {
        let identity = identity.ok_or(SyncError::NotLoggedIn)?;
        if self.state.is_installed(&app.id) {
            return Err(SyncError::AlreadyInstalled {
                name: app.name.clone(),
            });
        }

        let mut apps = self.state.downloaded_apps(&catalog.apps);
        apps.push(app);
        let encoded = serialize_downloads(apps);

        if let Err(e) = self
            .store
            .update_field(identity.as_str(), RecordField::Downloads, &encoded)
            .await
        {
            error!(user = %identity, app = %app.name, "Failed to record download: {}", e);
            return Err(e.into());
        }

        self.state.downloads.push(app.id.clone());
        info!(user = %identity, app = %app.name, "Recorded download");
        Ok(())
    }

    /// Overwrite the user's complaint or suggestion with `text`.
    ///
    /// Blank text is skipped without a request. On failure the cached text
    /// is left as it was.
    pub async fn submit_feedback(
        &mut self,
        identity: Option<&UserIdentity>,
        kind: FeedbackKind,
        text: &str,
    ) -> Result<FeedbackOutcome, SyncError> {
        if text.trim().is_empty() {
            return Ok(FeedbackOutcome::Skipped);
        }
        let identity = identity.ok_or(SyncError::NotLoggedIn)?;

        self.store
            .update_field(identity.as_str(), kind.field(), text)
            .await
            .map_err(|e| {
                error!(user = %identity, field = %kind.field(), "Failed to submit feedback: {}", e);
                SyncError::from(e)
            })?;

        match kind {
            FeedbackKind::Complaint => self.state.complaints = text.to_string(),
            FeedbackKind::Suggestion => self.state.suggestion = text.to_string(),
        }
        Ok(FeedbackOutcome::Submitted)
    }
}

impl std::fmt::Debug for UserSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSync")
            .field("store", &self.store.name())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}
