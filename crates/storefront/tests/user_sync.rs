//! User record sync against the in-memory record store.

use std::sync::Arc;

use catalog::{App, Catalog};
use record_store::{MemoryStore, UserRow};
use serde_json::json;
use storefront::{FeedbackKind, FeedbackOutcome, SyncError, UserIdentity, UserSync};

fn app(id: &str, name: &str) -> App {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "category": "Games",
        "iconUrl": "",
        "downloadUrl": ""
    }))
    .unwrap()
}

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(
        vec![app("a1", "Foo"), app("a2", "Bar"), app("a3", "Baz")],
        Vec::new(),
    ))
}

fn user(name: &str) -> UserIdentity {
    UserIdentity::new(name).unwrap()
}

fn row(username: &str, downloads: &str) -> UserRow {
    UserRow {
        username: username.to_string(),
        downloads: downloads.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fetch_dedups_downloads() {
    let store = Arc::new(MemoryStore::new().with_row(row("ada", "Foo,Bar,Foo")));
    let catalog = Arc::new(Catalog::new(vec![app("a1", "Foo"), app("a2", "Bar")], Vec::new()));
    let mut sync = UserSync::new(store.clone());

    sync.refresh(Some(&user("ada")), &catalog).await;

    let names: Vec<&str> = sync
        .state()
        .downloaded_apps(&catalog.apps)
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Foo", "Bar"]);
}

#[tokio::test]
async fn test_fetch_drops_unknown_names_and_is_case_sensitive() {
    let store = Arc::new(MemoryStore::new().with_row(UserRow {
        username: "ada".to_string(),
        downloads: "Gone,foo,Baz,".to_string(),
        complaints: "too slow".to_string(),
        suggestion: "more games".to_string(),
    }));
    let mut sync = UserSync::new(store.clone());

    sync.refresh(Some(&user("ada")), &catalog()).await;

    assert_eq!(sync.state().downloads, vec!["a3".to_string()]);
    assert_eq!(sync.state().complaints, "too slow");
    assert_eq!(sync.state().suggestion, "more games");
}

#[tokio::test]
async fn test_fetch_uses_first_matching_row() {
    let store = Arc::new(
        MemoryStore::new()
            .with_row(row("ada", "Foo"))
            .with_row(row("ada", "Bar")),
    );
    let mut sync = UserSync::new(store.clone());

    sync.refresh(Some(&user("ada")), &catalog()).await;
    assert_eq!(sync.state().downloads, vec!["a1".to_string()]);
}

#[tokio::test]
async fn test_missing_row_is_empty_state() {
    let store = Arc::new(MemoryStore::new());
    let mut sync = UserSync::new(store.clone());

    sync.refresh(Some(&user("ghost")), &catalog()).await;
    assert!(sync.state().downloads.is_empty());
    assert_eq!(sync.state().complaints, "");
    assert_eq!(store.search_calls(), 1);
}

#[tokio::test]
async fn test_no_fetch_without_identity_or_catalog() {
    let store = Arc::new(MemoryStore::new().with_row(row("ada", "Foo")));
    let mut sync = UserSync::new(store.clone());

    sync.refresh(None, &catalog()).await;
    sync.refresh(Some(&user("ada")), &Arc::new(Catalog::default())).await;

    assert_eq!(store.search_calls(), 0);
    assert!(sync.state().downloads.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_resets_state() {
    let store = Arc::new(MemoryStore::new().with_row(row("ada", "Foo")));
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();

    sync.refresh(Some(&user("ada")), &catalog).await;
    assert_eq!(sync.state().downloads.len(), 1);

    store.set_fail_reads(true);
    sync.refresh(Some(&user("ada")), &catalog).await;
    assert!(sync.state().downloads.is_empty());
}

#[tokio::test]
async fn test_stale_fetch_is_dropped() {
    let store = Arc::new(
        MemoryStore::new()
            .with_row(row("ada", "Foo"))
            .with_row(row("bob", "Bar")),
    );
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();

    let first = sync.start_fetch(Some(&user("ada")), &catalog).unwrap();
    let second = sync.start_fetch(Some(&user("bob")), &catalog).unwrap();
    assert!(second.generation() > first.generation());

    let first = first.run().await;
    let second = second.run().await;

    assert!(sync.apply(second));
    assert!(!sync.apply(first));
    assert_eq!(sync.state().downloads, vec!["a2".to_string()]);
}

#[tokio::test]
async fn test_sign_out_invalidates_in_flight_fetch() {
    let store = Arc::new(MemoryStore::new().with_row(row("ada", "Foo")));
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();

    let pending = sync.start_fetch(Some(&user("ada")), &catalog).unwrap();
    assert!(sync.start_fetch(None, &catalog).is_none());

    let fetched = pending.run().await;
    assert!(!sync.apply(fetched));
    assert!(sync.state().downloads.is_empty());
}

#[tokio::test]
async fn test_record_download_requires_identity() {
    let store = Arc::new(MemoryStore::new());
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();

    let err = sync
        .record_download(None, &catalog.apps[0], &catalog)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotLoggedIn));
    assert_eq!(store.update_calls(), 0);
}

#[tokio::test]
async fn test_record_download_twice() {
    let store = Arc::new(MemoryStore::new().with_user("ada"));
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();
    let ada = user("ada");

    sync.refresh(Some(&ada), &catalog).await;
    sync.record_download(Some(&ada), &catalog.apps[1], &catalog)
        .await
        .unwrap();
    assert_eq!(store.update_calls(), 1);
    assert_eq!(store.row("ada").unwrap().downloads, "Bar");

    let err = sync
        .record_download(Some(&ada), &catalog.apps[1], &catalog)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::AlreadyInstalled { ref name } if name == "Bar"));
    assert_eq!(store.update_calls(), 1);

    sync.record_download(Some(&ada), &catalog.apps[0], &catalog)
        .await
        .unwrap();
    assert_eq!(store.row("ada").unwrap().downloads, "Bar,Foo");
    assert_eq!(sync.state().downloads, vec!["a2".to_string(), "a1".to_string()]);
}

#[tokio::test]
async fn test_record_download_failure_keeps_state() {
    let store = Arc::new(MemoryStore::new().with_row(row("ada", "Foo")));
    let mut sync = UserSync::new(store.clone());
    let catalog = catalog();
    let ada = user("ada");

    sync.refresh(Some(&ada), &catalog).await;
    store.set_fail_writes(true);

    let err = sync
        .record_download(Some(&ada), &catalog.apps[2], &catalog)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
    assert_eq!(sync.state().downloads, vec!["a1".to_string()]);
    assert_eq!(store.row("ada").unwrap().downloads, "Foo");

    // A later attempt is a fresh single try.
    store.set_fail_writes(false);
    sync.record_download(Some(&ada), &catalog.apps[2], &catalog)
        .await
        .unwrap();
    assert_eq!(store.row("ada").unwrap().downloads, "Foo,Baz");
}

#[tokio::test]
async fn test_blank_feedback_is_skipped() {
    let store = Arc::new(MemoryStore::new().with_row(UserRow {
        username: "ada".to_string(),
        complaints: "old".to_string(),
        ..Default::default()
    }));
    let mut sync = UserSync::new(store.clone());
    let ada = user("ada");
    sync.refresh(Some(&ada), &catalog()).await;

    for blank in ["", "   ", "\n\t"] {
        let outcome = sync
            .submit_feedback(Some(&ada), FeedbackKind::Complaint, blank)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Skipped);
    }
    assert_eq!(store.update_calls(), 0);
    assert_eq!(sync.state().complaints, "old");
}

#[tokio::test]
async fn test_feedback_overwrites_single_field() {
    let store = Arc::new(MemoryStore::new().with_row(UserRow {
        username: "ada".to_string(),
        complaints: "old".to_string(),
        suggestion: "keep".to_string(),
        ..Default::default()
    }));
    let mut sync = UserSync::new(store.clone());
    let ada = user("ada");
    sync.refresh(Some(&ada), &catalog()).await;

    let outcome = sync
        .submit_feedback(Some(&ada), FeedbackKind::Complaint, "crashes on start")
        .await
        .unwrap();
    assert_eq!(outcome, FeedbackOutcome::Submitted);

    let stored = store.row("ada").unwrap();
    assert_eq!(stored.complaints, "crashes on start");
    assert_eq!(stored.suggestion, "keep");
    assert_eq!(sync.state().complaints, "crashes on start");
}

#[tokio::test]
async fn test_feedback_failure_keeps_cached_text() {
    let store = Arc::new(MemoryStore::new().with_row(UserRow {
        username: "ada".to_string(),
        suggestion: "old idea".to_string(),
        ..Default::default()
    }));
    let mut sync = UserSync::new(store.clone());
    let ada = user("ada");
    sync.refresh(Some(&ada), &catalog()).await;

    store.set_fail_writes(true);
    let err = sync
        .submit_feedback(Some(&ada), FeedbackKind::Suggestion, "new idea")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
    assert_eq!(sync.state().suggestion, "old idea");
}
