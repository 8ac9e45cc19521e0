//! Integration tests for the storage layer
//!
//! Runs against in-memory SQLite. PostgreSQL coverage runs when
//! `DATABASE_URL` points at a reachable server.

use chrono::{Duration, Utc};
use snaplink::models::{NewClickEvent, NewLink};
use snaplink::storage::{PostgresStorage, SqliteStorage, Storage, StorageError};
use std::sync::Arc;

/// Helper to create SQLite test storage
async fn create_sqlite_storage(max_connections: u32) -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", max_connections)
        .await
        .unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper to create PostgreSQL test storage
async fn create_postgres_storage() -> Option<Arc<dyn Storage>> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    if !db_url.starts_with("postgres") {
        return None;
    }
    let storage = PostgresStorage::new(&db_url, 5).await.ok()?;
    storage.init().await.ok()?;
    Some(Arc::new(storage))
}

fn new_link(alias: &str, url: &str) -> NewLink {
    NewLink {
        alias: alias.to_string(),
        original_url: url.to_string(),
        expires_at: None,
    }
}

fn click(link_id: i64) -> NewClickEvent {
    NewClickEvent {
        link_id,
        ip: Some("203.0.113.1".to_string()),
        city: Some("Unknown".to_string()),
        country: Some("Unknown".to_string()),
        user_agent: Some("test".to_string()),
        device: Some("Desktop".to_string()),
        browser: Some("Unknown".to_string()),
    }
}

#[tokio::test]
async fn test_create_and_get_link_sqlite() {
    let storage = create_sqlite_storage(1).await;
    let expires_at = Utc::now() + Duration::days(1);

    let created = storage
        .create_link(&NewLink {
            alias: "docs".to_string(),
            original_url: "https://example.com/docs".to_string(),
            expires_at: Some(expires_at),
        })
        .await
        .unwrap();

    assert_eq!(created.alias, "docs");
    assert_eq!(created.original_url, "https://example.com/docs");
    assert_eq!(
        created.expires_at.map(|t| t.timestamp()),
        Some(expires_at.timestamp())
    );

    let by_alias = storage.get_link_by_alias("docs").await.unwrap().unwrap();
    assert_eq!(by_alias.id, created.id);

    let by_id = storage.get_link_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.alias, "docs");

    assert!(storage.get_link_by_alias("missing").await.unwrap().is_none());
    assert!(storage.get_link_by_id(created.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_alias_is_conflict_and_keeps_original_sqlite() {
    let storage = create_sqlite_storage(1).await;

    storage
        .create_link(&new_link("same", "https://first.example"))
        .await
        .unwrap();

    let err = storage
        .create_link(&new_link("same", "https://second.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let link = storage.get_link_by_alias("same").await.unwrap().unwrap();
    assert_eq!(link.original_url, "https://first.example");
    assert_eq!(storage.list_links().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_link_creation_sqlite() {
    // Racing creates of one alias: the unique constraint lets exactly one win
    let storage = create_sqlite_storage(1).await;

    let mut handles = vec![];
    for i in 0..10 {
        let storage_clone = Arc::clone(&storage);
        handles.push(tokio::spawn(async move {
            storage_clone
                .create_link(&new_link("same_code", &format!("https://example.com/{i}")))
                .await
        }));
    }

    let mut success_count = 0;
    let mut conflict_count = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => success_count += 1,
            Err(StorageError::Conflict) => conflict_count += 1,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(success_count, 1, "Exactly one creation should succeed");
    assert_eq!(conflict_count, 9, "All others should get conflict");
}

#[tokio::test]
async fn test_list_links_orders_newest_first_with_click_counts_sqlite() {
    let storage = create_sqlite_storage(1).await;

    let first = storage
        .create_link(&new_link("first", "https://one.example"))
        .await
        .unwrap();
    let second = storage
        .create_link(&new_link("second", "https://two.example"))
        .await
        .unwrap();
    let third = storage
        .create_link(&new_link("third", "https://three.example"))
        .await
        .unwrap();

    // Interleave clicks so counts don't follow insertion order
    for link_id in [third.id, first.id, third.id, first.id, third.id] {
        storage.record_click(&click(link_id)).await.unwrap();
    }

    let links = storage.list_links().await.unwrap();
    let summary: Vec<(&str, i64)> = links
        .iter()
        .map(|l| (l.link.alias.as_str(), l.clicks))
        .collect();
    assert_eq!(summary, vec![("third", 3), ("second", 0), ("first", 2)]);

    for pair in links.windows(2) {
        assert!(pair[0].link.created_at >= pair[1].link.created_at);
    }

    assert_eq!(storage.count_clicks(second.id).await.unwrap(), 0);
    assert_eq!(storage.count_clicks(third.id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_list_clicks_newest_first_sqlite() {
    let storage = create_sqlite_storage(1).await;
    let link = storage
        .create_link(&new_link("events", "https://example.com"))
        .await
        .unwrap();

    for agent in ["a", "b", "c"] {
        storage
            .record_click(&NewClickEvent {
                user_agent: Some(agent.to_string()),
                ..click(link.id)
            })
            .await
            .unwrap();
    }

    let clicks = storage.list_clicks(link.id).await.unwrap();
    let agents: Vec<&str> = clicks
        .iter()
        .map(|c| c.user_agent.as_deref().unwrap())
        .collect();
    assert_eq!(agents, vec!["c", "b", "a"]);
    assert!(clicks.iter().all(|c| c.link_id == link.id));
    assert!(storage.list_clicks(link.id + 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_click_requires_existing_link_sqlite() {
    let storage = create_sqlite_storage(1).await;
    assert!(storage.record_click(&click(4242)).await.is_err());
    assert_eq!(storage.count_clicks(4242).await.unwrap(), 0);
}

#[tokio::test]
async fn test_init_is_idempotent_sqlite() {
    let storage = create_sqlite_storage(1).await;
    storage
        .create_link(&new_link("keep", "https://example.com"))
        .await
        .unwrap();

    storage.init().await.unwrap();
    assert!(storage.get_link_by_alias("keep").await.unwrap().is_some());
}

#[tokio::test]
async fn test_create_and_list_postgres() {
    let Some(storage) = create_postgres_storage().await else {
        return;
    };

    let alias = format!("pg{}", Utc::now().timestamp_micros());
    let link = storage
        .create_link(&new_link(&alias, "https://example.com"))
        .await
        .unwrap();
    storage.record_click(&click(link.id)).await.unwrap();

    let err = storage
        .create_link(&new_link(&alias, "https://other.example"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let listed = storage.list_links().await.unwrap();
    let entry = listed.iter().find(|l| l.link.alias == alias).unwrap();
    assert_eq!(entry.clicks, 1);
    assert_eq!(storage.list_clicks(link.id).await.unwrap().len(), 1);
}
