//! Application state.
//!
//! `AppState` owns the catalog, the session, the user record sync and the
//! ephemeral view state. Every mutation goes through it, and observers learn
//! about changes through a broadcast channel of [`StateChange`] events.

use std::fmt;
use std::sync::Arc;

use catalog::{
    projection, App, Catalog, Category, CategoryFilter, FeaturedCarousel, HomeEntry, UpdateEntry,
};
use record_store::RecordStore;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{AuthError, SyncError};
use crate::identity::{IdentityStore, UserIdentity};
use crate::notice::{Notice, Notices};
use crate::session::Session;
use crate::sync::{FeedbackKind, FeedbackOutcome, FetchResult, PendingFetch, UserState, UserSync};

/// Top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Categories,
    Updates,
    Account,
}

impl Page {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "home" => Some(Page::Home),
            "categories" => Some(Page::Categories),
            "updates" => Some(Page::Updates),
            "account" => Some(Page::Account),
            _ => None,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Home => "Home",
            Page::Categories => "Categories",
            Page::Updates => "Updates",
            Page::Account => "Account",
        };
        f.write_str(name)
    }
}

/// Accordion sections on the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Downloads,
    Complaint,
    Suggestion,
    About,
    Privacy,
}

/// Ephemeral, unpersisted view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub page: Page,
    /// Selected app id. When set, the detail view replaces the page.
    pub selected: Option<String>,
    pub search: String,
    pub category: CategoryFilter,
    pub open_section: Option<ProfileSection>,
    pub complaint_draft: String,
    pub suggestion_draft: String,
    /// Inline message on the sign-in form.
    pub auth_message: Option<String>,
}

/// Which part of the state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Catalog,
    Identity,
    UserState,
    View,
    Notice,
}

/// What the front end should render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Detail(&'a App),
    Home {
        options: Vec<CategoryFilter>,
        selected: CategoryFilter,
        search: &'a str,
        entries: Vec<HomeEntry<'a>>,
        /// Visible slide of each featured strip, in list order.
        featured: Vec<usize>,
    },
    Categories(Vec<(Category, Vec<&'a App>)>),
    Updates(Vec<UpdateEntry<'a>>),
    Profile {
        identity: &'a UserIdentity,
        downloads: Vec<&'a App>,
        complaints: &'a str,
        suggestion: &'a str,
        open_section: Option<ProfileSection>,
    },
    SignIn {
        message: Option<&'a str>,
    },
}

const EVENT_CAPACITY: usize = 64;

/// The single owner of storefront state.
///
/// Featured strips and notices run tokio timers, so a populated `AppState`
/// must live inside a tokio runtime.
pub struct AppState {
    catalog: Arc<Catalog>,
    session: Session,
    sync: UserSync,
    view: ViewState,
    notices: Notices,
    /// One carousel per featured strip on the home list.
    featured: Vec<FeaturedCarousel>,
    events: broadcast::Sender<StateChange>,
}

impl AppState {
    /// Create state with an empty catalog and no identity.
    pub fn new(store: Arc<dyn RecordStore>, persistence: Arc<dyn IdentityStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            catalog: Arc::new(Catalog::default()),
            session: Session::new(Arc::clone(&store), persistence),
            sync: UserSync::new(store),
            view: ViewState::default(),
            notices: Notices::new(),
            featured: Vec::new(),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    fn notify(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.events.send(change);
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn identity(&self) -> Option<&UserIdentity> {
        self.session.current()
    }

    pub fn user_state(&self) -> &UserState {
        self.sync.state()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    fn show_notice(&mut self, notice: Notice) {
        self.notices.show(notice);
        self.notify(StateChange::Notice);
    }

    /// Replace the catalog and refetch the user's state against it.
    pub async fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = Arc::new(catalog);
        if let Some(id) = &self.view.selected {
            if self.catalog.app(id).is_none() {
                self.view.selected = None;
            }
        }
        self.refresh_featured();
        self.notify(StateChange::Catalog);
        self.resync().await;
    }

    /// Restore the persisted identity and fetch its state.
    pub async fn restore_session(&mut self) -> Option<UserIdentity> {
        let restored = self.session.restore();
        self.notify(StateChange::Identity);
        self.resync().await;
        restored
    }

    /// Fetch the user's state for the current identity and catalog.
    pub async fn resync(&mut self) {
        if let Some(pending) = self.begin_resync() {
            let fetched = pending.run().await;
            self.apply_fetch(fetched);
        }
    }

    /// Start a user fetch without holding the state while it runs.
    ///
    /// Any fetch already in flight becomes stale. Without an identity or with
    /// an empty catalog the user state is cleared and `None` is returned.
    /// The returned fetch can be run on another task; hand its result to
    /// [`AppState::apply_fetch`].
    pub fn begin_resync(&mut self) -> Option<PendingFetch> {
        let pending = self.sync.start_fetch(self.session.current(), &self.catalog);
        if pending.is_none() {
            self.notify(StateChange::UserState);
        }
        pending
    }

    /// Apply a finished fetch. Returns false if a newer fetch or reset
    /// superseded it.
    pub fn apply_fetch(&mut self, fetched: FetchResult) -> bool {
        let applied = self.sync.apply(fetched);
        if applied {
            self.notify(StateChange::UserState);
        }
        applied
    }

    pub async fn login(&mut self, identifier: &str, secret: &str) -> Result<UserIdentity, AuthError> {
        match self.session.login(identifier, secret).await {
            Ok(identity) => {
                self.view.auth_message = None;
                self.notify(StateChange::Identity);
                self.resync().await;
                Ok(identity)
            }
            Err(e) => {
                self.view.auth_message = Some(e.user_message().to_string());
                self.notify(StateChange::View);
                Err(e)
            }
        }
    }

    /// Sign out and drop the profile page's local state.
    pub async fn logout(&mut self) {
        self.session.logout();
        self.view.open_section = None;
        self.view.complaint_draft.clear();
        self.view.suggestion_draft.clear();
        self.notify(StateChange::Identity);
        self.resync().await;
    }

    pub fn navigate(&mut self, page: Page) {
        debug!(%page, "Navigate");
        self.view.page = page;
        self.notify(StateChange::View);
    }

    /// Open the detail view for `app_id`. Returns false for unknown ids.
    pub fn select_app(&mut self, app_id: &str) -> bool {
        if self.catalog.app(app_id).is_none() {
            return false;
        }
        self.view.selected = Some(app_id.to_string());
        self.notify(StateChange::View);
        true
    }

    /// Leave the detail view.
    pub fn back(&mut self) {
        self.view.selected = None;
        self.notify(StateChange::View);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.search = search.into();
        self.refresh_featured();
        self.notify(StateChange::View);
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.view.category = category;
        self.refresh_featured();
        self.notify(StateChange::View);
    }

    /// Carousels for the featured strips of the current home list.
    pub fn featured(&self) -> &[FeaturedCarousel] {
        &self.featured
    }

    /// Show slide `index` of featured strip `strip`. Returns false if either
    /// is out of range.
    pub fn jump_featured(&mut self, strip: usize, index: usize) -> bool {
        let moved = self
            .featured
            .get_mut(strip)
            .map_or(false, |carousel| carousel.jump_to(index));
        if moved {
            self.notify(StateChange::View);
        }
        moved
    }

    /// Match the carousels to the strips of the filtered home list. A strip
    /// whose window changed rewinds and restarts its timer; strips that no
    /// longer exist are dropped with their timers.
    fn refresh_featured(&mut self) {
        let windows: Vec<Vec<String>> = projection::home_entries(&self.home_apps())
            .into_iter()
            .filter_map(|entry| match entry {
                HomeEntry::Featured(window) => {
                    Some(window.iter().map(|app| app.id.clone()).collect())
                }
                HomeEntry::App(_) => None,
            })
            .collect();

        self.featured.truncate(windows.len());
        for (strip, window) in windows.into_iter().enumerate() {
            match self.featured.get_mut(strip) {
                Some(carousel) => carousel.set_window(window),
                None => self.featured.push(FeaturedCarousel::new(window)),
            }
        }
        debug!(strips = self.featured.len(), "Featured strips refreshed");
    }

    /// Open `section`, or close it if it is already open.
    pub fn toggle_section(&mut self, section: ProfileSection) {
        self.view.open_section = if self.view.open_section == Some(section) {
            None
        } else {
            Some(section)
        };
        self.notify(StateChange::View);
    }

    pub fn set_draft(&mut self, kind: FeedbackKind, text: impl Into<String>) {
        match kind {
            FeedbackKind::Complaint => self.view.complaint_draft = text.into(),
            FeedbackKind::Suggestion => self.view.suggestion_draft = text.into(),
        }
        self.notify(StateChange::View);
    }

    /// Install `app_id` for the signed-in user, with a notice for every
    /// outcome. Without an identity the account page is opened.
    pub async fn install(&mut self, app_id: &str) -> Result<(), SyncError> {
        let catalog = Arc::clone(&self.catalog);
        let app = catalog.app(app_id).ok_or_else(|| SyncError::UnknownApp {
            id: app_id.to_string(),
        })?;

        let result = self
            .sync
            .record_download(self.session.current(), app, &catalog)
            .await;

        let notice = match &result {
            Ok(()) => Notice::success(format!("{} installed successfully!", app.name)),
            Err(SyncError::NotLoggedIn) => {
                self.navigate(Page::Account);
                Notice::failure("Please log in to install apps.")
            }
            Err(SyncError::AlreadyInstalled { name }) => {
                Notice::failure(format!("{} is already installed.", name))
            }
            Err(_) => Notice::failure("Failed to record installation."),
        };
        if result.is_ok() {
            self.notify(StateChange::UserState);
        }
        self.show_notice(notice);
        result
    }

    /// Submit the draft for `kind`. A successful submission clears the draft;
    /// a blank draft does nothing.
    pub async fn submit_feedback(&mut self, kind: FeedbackKind) -> Result<FeedbackOutcome, SyncError> {
        let text = match kind {
            FeedbackKind::Complaint => self.view.complaint_draft.clone(),
            FeedbackKind::Suggestion => self.view.suggestion_draft.clone(),
        };

        match self
            .sync
            .submit_feedback(self.session.current(), kind, &text)
            .await
        {
            Ok(FeedbackOutcome::Skipped) => Ok(FeedbackOutcome::Skipped),
            Ok(FeedbackOutcome::Submitted) => {
                match kind {
                    FeedbackKind::Complaint => self.view.complaint_draft.clear(),
                    FeedbackKind::Suggestion => self.view.suggestion_draft.clear(),
                }
                self.notify(StateChange::UserState);
                self.notify(StateChange::View);
                self.show_notice(Notice::success("Your feedback has been submitted. Thank you!"));
                Ok(FeedbackOutcome::Submitted)
            }
            Err(e) => {
                self.show_notice(Notice::failure("Failed to submit feedback. Please try again."));
                Err(e)
            }
        }
    }

    /// Filtered home list without featured strips.
    pub fn home_apps(&self) -> Vec<&App> {
        projection::home_filter(&self.catalog.apps, self.view.category, &self.view.search)
    }

    /// Project the state into the screen to render.
    pub fn screen(&self) -> Screen<'_> {
        if let Some(app) = self
            .view
            .selected
            .as_deref()
            .and_then(|id| self.catalog.app(id))
        {
            return Screen::Detail(app);
        }

        match self.view.page {
            Page::Home => Screen::Home {
                options: projection::category_options(&self.catalog.apps),
                selected: self.view.category,
                search: &self.view.search,
                entries: projection::home_entries(&self.home_apps()),
                featured: self
                    .featured
                    .iter()
                    .map(FeaturedCarousel::current_index)
                    .collect(),
            },
            Page::Categories => Screen::Categories(projection::category_groups(&self.catalog.apps)),
            Page::Updates => Screen::Updates(projection::updates_join(
                &self.catalog.apps,
                &self.catalog.updates,
            )),
            Page::Account => match self.session.current() {
                Some(identity) => {
                    let state = self.sync.state();
                    Screen::Profile {
                        identity,
                        downloads: state.downloaded_apps(&self.catalog.apps),
                        complaints: &state.complaints,
                        suggestion: &state.suggestion,
                        open_section: self.view.open_section,
                    }
                }
                None => Screen::SignIn {
                    message: self.view.auth_message.as_deref(),
                },
            },
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("apps", &self.catalog.apps.len())
            .field("updates", &self.catalog.updates.len())
            .field("session", &self.session)
            .field("view", &self.view)
            .field("featured", &self.featured.len())
            .finish()
    }
}
