//! Catalog data types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// App category. The catalog only ever uses these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Games,
    Productivity,
    Social,
    Tools,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Games,
        Category::Productivity,
        Category::Social,
        Category::Tools,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Games => "Games",
            Category::Productivity => "Productivity",
            Category::Social => "Social",
            Category::Tools => "Tools",
        }
    }

    /// Parse a category name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An older build that can still be downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousVersion {
    pub version: String,
    pub download_url: String,
}

/// A catalog entry.
///
/// `name` doubles as the join key against the remote downloads list, so it is
/// expected to be unique even though nothing enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub icon_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    /// Star rating, 0 when the feed value is not a number.
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: f64,
    /// Display string such as "10M+".
    #[serde(default)]
    pub downloads: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub developer: String,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub feature_images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_versions")]
    pub previous_versions: Vec<PreviousVersion>,
}

impl App {
    /// Rating with one decimal place, as shown on the detail page.
    pub fn formatted_rating(&self) -> String {
        format!("{:.1}", self.rating)
    }

    /// Number of filled stars out of five.
    pub fn filled_stars(&self) -> usize {
        self.rating.floor().clamp(0.0, 5.0) as usize
    }
}

/// A "what's new" entry for an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdate {
    pub id: String,
    /// Foreign key into `App::id`.
    pub app_id: String,
    pub version: String,
    #[serde(default)]
    pub update_date: String,
    #[serde(default)]
    pub update_notes: String,
}

fn lenient_rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|r| r.is_finite()).unwrap_or(0.0))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_versions<'de, D>(deserializer: D) -> Result<Vec<PreviousVersion>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
