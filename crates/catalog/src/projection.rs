//! Pure view derivations over the catalog.
//!
//! Nothing here performs I/O; every function recomputes its result from the
//! explicit inputs it is given.

use std::fmt;

use crate::models::{App, AppUpdate, Category};

/// Number of home list items per featured strip.
pub const FEATURED_WINDOW: usize = 8;

/// Category chip selected on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parse "All" or a category name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        Category::parse(name).map(CategoryFilter::Only)
    }

    pub fn matches(self, app: &App) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => app.category == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

/// One row of the home list.
#[derive(Debug, Clone, PartialEq)]
pub enum HomeEntry<'a> {
    App(&'a App),
    /// Featured strip holding the eight apps ending at the preceding row.
    Featured(Vec<&'a App>),
}

/// An update joined with the app it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateEntry<'a> {
    pub update: &'a AppUpdate,
    pub app: &'a App,
}

/// Distinct categories in first-seen order, prefixed with `All`.
pub fn category_options(apps: &[App]) -> Vec<CategoryFilter> {
    let mut options = vec![CategoryFilter::All];
    for app in apps {
        let option = CategoryFilter::Only(app.category);
        if !options.contains(&option) {
            options.push(option);
        }
    }
    options
}

/// Apps matching the category filter whose name contains `search`,
/// ignoring case. An empty search matches everything.
pub fn home_filter<'a>(apps: &'a [App], filter: CategoryFilter, search: &str) -> Vec<&'a App> {
    let needle = search.to_lowercase();
    apps.iter()
        .filter(|app| filter.matches(app))
        .filter(|app| app.name.to_lowercase().contains(&needle))
        .collect()
}

/// Interleave featured strips into a filtered home list: after every
/// [`FEATURED_WINDOW`]th app, a strip with the preceding window is inserted.
pub fn home_entries<'a>(filtered: &[&'a App]) -> Vec<HomeEntry<'a>> {
    let mut entries = Vec::with_capacity(filtered.len() + filtered.len() / FEATURED_WINDOW);
    for (index, app) in filtered.iter().copied().enumerate() {
        entries.push(HomeEntry::App(app));
        if (index + 1) % FEATURED_WINDOW == 0 {
            let start = (index + 1).saturating_sub(FEATURED_WINDOW);
            entries.push(HomeEntry::Featured(filtered[start..=index].to_vec()));
        }
    }
    entries
}

/// Partition apps by category. Groups appear in first-seen order and keep
/// the catalog order of their members.
pub fn category_groups(apps: &[App]) -> Vec<(Category, Vec<&App>)> {
    let mut groups: Vec<(Category, Vec<&App>)> = Vec::new();
    for app in apps {
        match groups.iter_mut().find(|(category, _)| *category == app.category) {
            Some((_, members)) => members.push(app),
            None => groups.push((app.category, vec![app])),
        }
    }
    groups
}

/// Join each update with its app, dropping updates for unknown apps. Update
/// order is preserved.
pub fn updates_join<'a>(apps: &'a [App], updates: &'a [AppUpdate]) -> Vec<UpdateEntry<'a>> {
    updates
        .iter()
        .filter_map(|update| {
            apps.iter()
                .find(|app| app.id == update.app_id)
                .map(|app| UpdateEntry { update, app })
        })
        .collect()
}

/// Resolve app ids against the catalog in the order given, skipping unknown
/// ids.
pub fn resolve_ids<'a, S: AsRef<str>>(apps: &'a [App], ids: &[S]) -> Vec<&'a App> {
    ids.iter()
        .filter_map(|id| apps.iter().find(|app| app.id == id.as_ref()))
        .collect()
}
