//! Row and request types for the record store.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One row of the user table as returned by a search.
///
/// Spreadsheet cells come back as loosely typed JSON, so every column is
/// decoded leniently: missing, `null` or non-string cells become text or the
/// empty string. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRow {
    #[serde(default, deserialize_with = "cell_text")]
    pub username: String,

    /// Comma-joined app names.
    #[serde(default, deserialize_with = "cell_text")]
    pub downloads: String,

    /// Latest complaint text.
    #[serde(default, deserialize_with = "cell_text")]
    pub complaints: String,

    /// Latest suggestion text.
    #[serde(default, deserialize_with = "cell_text")]
    pub suggestion: String,
}

fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

/// Mutable columns that can be overwritten with a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Downloads,
    Complaints,
    /// Stored under the singular column name `suggestion`.
    Suggestion,
}

impl RecordField {
    /// Column name in the remote table.
    pub fn column(self) -> &'static str {
        match self {
            RecordField::Downloads => "downloads",
            RecordField::Complaints => "complaints",
            RecordField::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// New row written on sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Body of a bulk insert request: `{"data": [rows...]}`.
#[derive(Debug, Serialize)]
pub(crate) struct InsertRequest<'a> {
    pub data: &'a [NewUser],
}

/// Body of a partial update request: `{"data": {"column": "value"}}`.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateRequest {
    pub data: Map<String, Value>,
}

impl UpdateRequest {
    pub fn single(field: RecordField, value: &str) -> Self {
        let mut data = Map::new();
        data.insert(field.column().to_string(), Value::String(value.to_string()));
        Self { data }
    }
}

/// Decode a search response body into rows.
///
/// A body that is not a JSON array yields no rows. Array entries that are not
/// objects are skipped.
pub fn rows_from_value(value: Value) -> Vec<UserRow> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_lenient_cells() {
        let row: UserRow = serde_json::from_value(json!({
            "username": "ada",
            "password": "secret",
            "downloads": null,
            "complaints": 42,
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(row.username, "ada");
        assert_eq!(row.downloads, "");
        assert_eq!(row.complaints, "42");
        assert_eq!(row.suggestion, "");
    }

    #[test]
    fn test_rows_from_non_array() {
        assert!(rows_from_value(json!({"error": "not found"})).is_empty());
        assert!(rows_from_value(json!("oops")).is_empty());
    }

    #[test]
    fn test_rows_skip_non_objects() {
        let rows = rows_from_value(json!([1, {"username": "ada"}, "x"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "ada");
    }

    #[test]
    fn test_update_request_shape() {
        let body = UpdateRequest::single(RecordField::Suggestion, "more games");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"data": {"suggestion": "more games"}}));
    }

    #[test]
    fn test_insert_request_shape() {
        let rows = [NewUser {
            username: "ada".to_string(),
            password: "pw".to_string(),
        }];
        let value = serde_json::to_value(InsertRequest { data: &rows }).unwrap();
        assert_eq!(
            value,
            json!({"data": [{"username": "ada", "password": "pw"}]})
        );
    }
}
