// ABOUTME: Concurrent writers against a file-backed WAL database
// ABOUTME: Parallel creates and updates must all succeed and keep milestone order gap-free

use std::sync::Arc;

use plankit_storage::{connect, decode, ensure_tables, NamedResource, RowStorage, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

const WRITERS: usize = 20;

async fn file_pool(dir: &TempDir) -> (sqlx::SqlitePool, SchemaRegistry) {
    let url = format!("sqlite:{}", dir.path().join("plankit.db").display());
    let pool = connect(&url, 8).await.unwrap();
    let registry = SchemaRegistry::builtin().unwrap();
    ensure_tables(&pool, &registry).await.unwrap();
    (pool, registry)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_milestone_creates_all_succeed() {
    let dir = TempDir::new().unwrap();
    let (pool, registry) = file_pool(&dir).await;
    let rows = Arc::new(RowStorage::new(pool.clone()));
    let schema = Arc::new(registry.named(NamedResource::MilestoneColumns).clone());

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let rows = rows.clone();
            let schema = schema.clone();
            tokio::spawn(async move {
                let values = decode(
                    &schema,
                    json!({ "column_name": format!("M{}", i) }).as_object().unwrap(),
                )
                .unwrap();
                rows.create(&schema, "project-a", &values).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let orders: Vec<i64> = rows
        .list(&schema, "project-a")
        .await
        .unwrap()
        .iter()
        .map(|row| row.get_i64("order").unwrap())
        .collect();
    assert_eq!(orders, (1..=WRITERS as i64).collect::<Vec<_>>());

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_updates_last_writer_wins() {
    let dir = TempDir::new().unwrap();
    let (pool, registry) = file_pool(&dir).await;
    let rows = Arc::new(RowStorage::new(pool.clone()));
    let schema = Arc::new(registry.named(NamedResource::SingleEntry).clone());

    let initial = decode(
        &schema,
        json!({"field_name": "scope", "content": "v0"}).as_object().unwrap(),
    )
    .unwrap();
    let created = rows.create(&schema, "project-a", &initial).await.unwrap();
    let id = Arc::new(created.id);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let rows = rows.clone();
            let schema = schema.clone();
            let id = id.clone();
            tokio::spawn(async move {
                let values = decode(
                    &schema,
                    json!({"field_name": "scope", "content": format!("v{}", i + 1)})
                        .as_object()
                        .unwrap(),
                )
                .unwrap();
                if i % 2 == 0 {
                    rows.update(&schema, "project-a", &id, &values).await
                } else {
                    rows.upsert_by(&schema, "project-a", "field_name", &values).await
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let listed = rows.list(&schema, "project-a").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get_str("content").unwrap().starts_with('v'));

    pool.close().await;
}
