use docmigrate::{
    ALL_AVAILABLE, MigrateResult, MigrationStore, Migrator, RedisStore, Registry, VersionRecord, no_action,
};
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;

mod common;

const COLLECTION: &str = "hello";
const INDEX: &str = "hello_idx";

fn seed(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.insert_document(COLLECTION, "world", &json!({"hello": "world"})).await }.boxed()
}

fn unseed(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.delete_document(COLLECTION, "world").await.map(|_| ()) }.boxed()
}

fn index(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.create_index(INDEX, COLLECTION, &["hello"]).await }.boxed()
}

fn unindex(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.drop_index(INDEX).await }.boxed()
}

fn registry() -> Registry<RedisStore> {
    let mut registry = Registry::new();
    registry.register("1_hello_world", Some(seed), Some(unseed)).unwrap();
    registry.register("2_hello_index", Some(index), Some(unindex)).unwrap();
    registry
}

#[tokio::test]
#[ignore = "requires a Redis Stack server at REDIS_URL"]
async fn ledger_appends_and_reads_latest() {
    let store = common::isolated_store("docmigrate_ledger").await;

    store.ensure_collection("migrations").await.unwrap();
    store.ensure_collection("migrations").await.unwrap();
    assert!(store.find_latest_record("migrations").await.unwrap().is_none());

    store.insert_record("migrations", &VersionRecord::now(2, "two")).await.unwrap();
    store.insert_record("migrations", &VersionRecord::now(1, "")).await.unwrap();

    let latest = store.find_latest_record("migrations").await.unwrap().unwrap();
    assert_eq!(latest.version, 1);
    assert!(latest.description.is_empty());

    let versions: Vec<u64> = store
        .list_records("migrations")
        .await
        .unwrap()
        .iter()
        .map(|record| record.version)
        .collect();
    assert_eq!(versions, vec![2, 1]);

    store.drop_collection("migrations").await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis Stack server at REDIS_URL"]
async fn migrator_round_trip_against_redis() {
    let store = common::isolated_store("docmigrate_round_trip").await;
    let mut migrator = Migrator::new(store.clone(), &registry());

    migrator.up(ALL_AVAILABLE).await.unwrap();
    assert_eq!(migrator.version().await.unwrap(), (2, "hello_index".to_string()));
    assert_eq!(
        store.get_document(COLLECTION, "world").await.unwrap(),
        Some(json!({"hello": "world"}))
    );
    assert_eq!(store.scan_documents(COLLECTION, 10).await.unwrap().len(), 1);
    assert!(store.index_names().await.unwrap().contains(&INDEX.to_string()));

    migrator.down(ALL_AVAILABLE).await.unwrap();
    assert_eq!(migrator.version().await.unwrap(), (0, String::new()));
    assert!(store.get_document(COLLECTION, "world").await.unwrap().is_none());
    assert!(!store.index_names().await.unwrap().contains(&INDEX.to_string()));

    store.drop_collection("migrations").await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis Stack server at REDIS_URL"]
async fn partial_replay_against_redis() {
    let store = common::isolated_store("docmigrate_partial").await;
    let mut registry = registry();
    registry.register("3_forward_only", Some(seed), no_action()).unwrap();
    let mut migrator = Migrator::new(store.clone(), &registry);

    migrator.up(1).await.unwrap();
    assert_eq!(migrator.version().await.unwrap(), (1, "hello_world".to_string()));
    assert!(!store.index_names().await.unwrap().contains(&INDEX.to_string()));

    migrator.up(ALL_AVAILABLE).await.unwrap();
    migrator.down(1).await.unwrap();
    // 3 has no down action, so 2 is reverted
    assert_eq!(migrator.version().await.unwrap(), (1, "hello_world".to_string()));

    migrator.down(ALL_AVAILABLE).await.unwrap();
    store.drop_collection(COLLECTION).await.unwrap();
    store.drop_collection("migrations").await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis Stack server at REDIS_URL"]
async fn set_version_on_fresh_ledger() {
    let store = common::isolated_store("docmigrate_fresh").await;
    let migrator = Migrator::new(store.clone(), &Registry::new());

    migrator.set_version(4, "restored").await.unwrap();
    assert_eq!(migrator.version().await.unwrap(), (4, "restored".to_string()));
    assert_eq!(migrator.history().await.unwrap().len(), 1);

    store.drop_collection("migrations").await.unwrap();
}

#[tokio::test]
#[ignore = "requires a Redis Stack server at REDIS_URL"]
async fn scan_keeps_colons_in_document_ids() {
    let store = common::isolated_store("docmigrate_scan").await;
    store.insert_document(COLLECTION, "tenant:42", &json!({"hello": "tenant"})).await.unwrap();

    let documents = store.scan_documents(COLLECTION, 10).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "tenant:42");
    assert_eq!(documents[0].data, json!({"hello": "tenant"}));

    store.drop_collection(COLLECTION).await.unwrap();
}
