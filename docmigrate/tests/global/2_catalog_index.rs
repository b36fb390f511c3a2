use docmigrate::{MigrateResult, RedisStore};
use futures::future::{BoxFuture, FutureExt};

use super::seed_catalog::CATALOG_COLLECTION;

pub const CATALOG_INDEX: &str = "catalog_idx";

fn up(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.create_index(CATALOG_INDEX, CATALOG_COLLECTION, &["a"]).await }.boxed()
}

fn down(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
    async move { store.drop_index(CATALOG_INDEX).await }.boxed()
}

docmigrate::submit_migration!(Some(up), Some(down));
