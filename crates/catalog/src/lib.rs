//! App catalog for the storefront.
//!
//! This crate owns everything derived from the two static feeds:
//!
//! - [`models`]: `App` and `AppUpdate` with lenient decoding
//! - [`feed`]: one-shot loading of the apps and updates documents
//! - [`projection`]: pure view derivations (home filter, category groups,
//!   updates join, featured windows)
//! - [`featured`]: the auto-rotating featured carousel
//!
//! # Example
//!
//! ```no_run
//! use catalog::{feed, projection, CategoryFilter, FeedConfig};
//!
//! # async fn example() {
//! let catalog = feed::load(&FeedConfig::new("apps.json", "updates.json")).await;
//!
//! for app in projection::home_filter(&catalog.apps, CategoryFilter::All, "chess") {
//!     println!("{} ({})", app.name, app.category);
//! }
//! # }
//! ```

pub mod error;
pub mod featured;
pub mod feed;
pub mod models;
pub mod projection;

pub use error::CatalogError;
pub use featured::{Carousel, FeaturedCarousel, ROTATION_INTERVAL};
pub use feed::{Catalog, FeedConfig, FeedSource};
pub use models::{App, AppUpdate, Category, PreviousVersion};
pub use projection::{CategoryFilter, HomeEntry, UpdateEntry, FEATURED_WINDOW};
