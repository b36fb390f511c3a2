/// Submit a migration to the global registry at compile time.
///
/// With two arguments the identity comes from the invoking file, which must
/// be named `<version>_<description>.rs`. Pass an identifier literal first to
/// name the migration explicitly.
///
/// Actions are `Option<fn(RedisStore) -> BoxFuture<'static, MigrateResult<()>>>`.
///
/// ```ignore
/// // src/migrations/1_seed_catalog.rs
/// use docmigrate::{MigrateResult, RedisStore};
/// use futures::future::{BoxFuture, FutureExt};
///
/// fn up(store: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
///     async move { store.insert_document("catalog", "a", &serde_json::json!({"a": "b"})).await }.boxed()
/// }
///
/// docmigrate::submit_migration!(Some(up), None);
/// ```
///
/// Submissions are validated when the global registry is first used; a
/// malformed file name or duplicate version panics there.
#[macro_export]
macro_rules! submit_migration {
    ($identifier:literal, $up:expr, $down:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::global::StaticMigration::new($identifier, $up, $down)
        }
    };
    ($up:expr, $down:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::global::StaticMigration::from_source(::core::file!(), $up, $down)
        }
    };
}
