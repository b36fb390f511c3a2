use docmigrate::{MigrateResult, RedisStore};
use futures::future::{BoxFuture, FutureExt};
use serde_json::json;

pub const CATALOG_COLLECTION: &str = "catalog";
pub const SEED_ID: &str = "a";

fn up(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move {
        store
            .insert_document(CATALOG_COLLECTION, SEED_ID, &json!({"a": "b"}))
            .await
    }
    .boxed()
}

fn down(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.delete_document(CATALOG_COLLECTION, SEED_ID).await.map(|_| ()) }.boxed()
}

docmigrate::submit_migration!(Some(up), Some(down));
