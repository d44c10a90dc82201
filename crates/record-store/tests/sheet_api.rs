//! Tests for `SheetClient` against an in-process server that speaks the
//! spreadsheet API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use record_store::{RecordField, RecordStore, SheetClient, StoreConfig, StoreError};
use serde_json::{json, Map, Value};

#[derive(Clone, Default)]
struct Sheet {
    rows: Arc<Mutex<Vec<Map<String, Value>>>>,
    fail: Arc<Mutex<bool>>,
    /// Raw request line targets and bodies, in arrival order.
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Sheet {
    fn record(&self, uri: &Uri, body: Value) {
        self.requests.lock().unwrap().push((uri.to_string(), body));
    }
}

async fn search(
    State(sheet): State<Sheet>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    sheet.record(&uri, Value::Null);
    if *sheet.fail.lock().unwrap() {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
    }
    let username = params.get("username").cloned().unwrap_or_default();
    let rows: Vec<Value> = sheet
        .rows
        .lock()
        .unwrap()
        .iter()
        .filter(|row| row.get("username") == Some(&Value::String(username.clone())))
        .map(|row| Value::Object(row.clone()))
        .collect();
    (StatusCode::OK, Json(Value::Array(rows)))
}

async fn insert(
    State(sheet): State<Sheet>,
    uri: Uri,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    sheet.record(&uri, body.clone());
    if *sheet.fail.lock().unwrap() {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "down"})));
    }
    let mut created = 0;
    if let Some(rows) = body.get("data").and_then(Value::as_array) {
        for row in rows {
            if let Some(obj) = row.as_object() {
                sheet.rows.lock().unwrap().push(obj.clone());
                created += 1;
            }
        }
    }
    (StatusCode::CREATED, Json(json!({"created": created})))
}

async fn update(
    State(sheet): State<Sheet>,
    uri: Uri,
    Path(username): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    sheet.record(&uri, body.clone());
    if *sheet.fail.lock().unwrap() {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
    }
    let mut updated = 0;
    let fields = body.get("data").and_then(Value::as_object).cloned().unwrap_or_default();
    for row in sheet.rows.lock().unwrap().iter_mut() {
        if row.get("username") == Some(&Value::String(username.clone())) {
            for (key, value) in &fields {
                row.insert(key.clone(), value.clone());
            }
            updated += 1;
        }
    }
    (StatusCode::OK, Json(json!({"updated": updated})))
}

async fn spawn_sheet() -> (Sheet, SheetClient) {
    let sheet = Sheet::default();
    let app = Router::new()
        .route("/", post(insert))
        .route("/search", get(search))
        .route("/username/:username", put(update))
        .with_state(sheet.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = SheetClient::new(StoreConfig::new(format!("http://{}", addr))).unwrap();
    (sheet, client)
}

#[tokio::test]
async fn test_insert_then_search() {
    let (_sheet, client) = spawn_sheet().await;

    assert!(client.search_by_username("ada@example.com").await.unwrap().is_empty());

    client.insert_user("ada@example.com", "pw").await.unwrap();
    let rows = client.search_by_username("ada@example.com").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].username, "ada@example.com");
    assert_eq!(rows[0].downloads, "");
}

#[tokio::test]
async fn test_update_single_field() {
    let (sheet, client) = spawn_sheet().await;
    client.insert_user("a b", "pw").await.unwrap();

    client
        .update_field("a b", RecordField::Downloads, "Foo,Bar")
        .await
        .unwrap();
    client
        .update_field("a b", RecordField::Suggestion, "more puzzles")
        .await
        .unwrap();

    let rows = client.search_by_username("a b").await.unwrap();
    assert_eq!(rows[0].downloads, "Foo,Bar");
    assert_eq!(rows[0].suggestion, "more puzzles");
    assert_eq!(rows[0].complaints, "");

    let stored = sheet.rows.lock().unwrap()[0].clone();
    assert_eq!(stored.get("password"), Some(&json!("pw")));
}

#[tokio::test]
async fn test_wire_format() {
    let (sheet, client) = spawn_sheet().await;
    let username = "ada smith+1@example.com";

    client.search_by_username(username).await.unwrap();
    client.insert_user(username, "pw").await.unwrap();
    client
        .update_field(username, RecordField::Complaints, "too slow")
        .await
        .unwrap();

    let requests = sheet.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 3);

    assert_eq!(requests[0].0, "/search?username=ada%20smith%2B1%40example.com");

    assert_eq!(requests[1].0, "/");
    assert_eq!(
        requests[1].1,
        json!({"data": [{"username": "ada smith+1@example.com", "password": "pw"}]})
    );

    assert_eq!(requests[2].0, "/username/ada%20smith%2B1%40example.com");
    assert_eq!(requests[2].1, json!({"data": {"complaints": "too slow"}}));

    let rows = client.search_by_username(username).await.unwrap();
    assert_eq!(rows[0].complaints, "too slow");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (sheet, client) = spawn_sheet().await;
    *sheet.fail.lock().unwrap() = true;

    let err = client.search_by_username("ada").await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 500, .. }));

    let err = client.insert_user("ada", "pw").await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 503, .. }));

    let err = client
        .update_field("ada", RecordField::Complaints, "slow")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_unreachable_store() {
    let client = SheetClient::new(StoreConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.search_by_username("ada").await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)));
}
