//! Process-wide migration registry bound to [`RedisStore`].
//!
//! Migrations submitted with [`submit_migration!`](crate::submit_migration)
//! are collected through `inventory` the first time the global registry is
//! touched. Runtime registration through [`register`] adds to the same set.
//! Every async entry point snapshots the registry and store, so no lock is
//! held across an `.await`.

use std::future::Future;

use futures::future::BoxFuture;
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::errors::{MigrateError, MigrateResult};
use crate::ledger::DEFAULT_MIGRATIONS_COLLECTION;
use crate::migration::Migration;
use crate::registry::Registry;
use crate::runner::{MigrationStats, Migrator};
use crate::store::RedisStore;

/// Action signature accepted by statically submitted migrations.
pub type StaticActionFn = fn(RedisStore) -> BoxFuture<'static, MigrateResult<()>>;

#[derive(Debug, Clone, Copy)]
enum Identity {
    /// `<version>_<description>`
    Identifier(&'static str),
    /// Source path ending in `<version>_<description>.rs`
    Source(&'static str),
}

/// A migration submitted at compile time.
///
/// Built by [`submit_migration!`](crate::submit_migration); rarely constructed by hand.
#[derive(Debug)]
pub struct StaticMigration {
    identity: Identity,
    up: Option<StaticActionFn>,
    down: Option<StaticActionFn>,
}

impl StaticMigration {
    pub const fn new(identifier: &'static str, up: Option<StaticActionFn>, down: Option<StaticActionFn>) -> Self {
        Self {
            identity: Identity::Identifier(identifier),
            up,
            down,
        }
    }

    pub const fn from_source(path: &'static str, up: Option<StaticActionFn>, down: Option<StaticActionFn>) -> Self {
        Self {
            identity: Identity::Source(path),
            up,
            down,
        }
    }

    fn register_into(&self, registry: &mut Registry<RedisStore>) -> MigrateResult<()> {
        match self.identity {
            Identity::Identifier(identifier) => registry.register(identifier, self.up, self.down),
            Identity::Source(path) => registry.register_source(path, self.up, self.down),
        }
    }
}

inventory::collect!(StaticMigration);

struct GlobalState {
    registry: Registry<RedisStore>,
    store: Option<RedisStore>,
    migrations_collection: String,
}

impl GlobalState {
    fn from_submissions() -> Self {
        let mut registry = Registry::new();
        for submission in inventory::iter::<StaticMigration>() {
            if let Err(err) = submission.register_into(&mut registry) {
                panic!("failed to register migration: {err}");
            }
        }
        debug!("collected {} submitted migration(s)", registry.len());

        Self {
            registry,
            store: None,
            migrations_collection: DEFAULT_MIGRATIONS_COLLECTION.to_string(),
        }
    }

    fn migrator(&self) -> MigrateResult<Migrator<RedisStore>> {
        let store = self.store.clone().ok_or(MigrateError::DatabaseNotSet)?;
        Ok(Migrator::new(store, &self.registry).with_collection(self.migrations_collection.clone()))
    }
}

static GLOBAL: Lazy<RwLock<GlobalState>> = Lazy::new(|| RwLock::new(GlobalState::from_submissions()));

/// Collect submitted migrations now rather than on first use.
///
/// Call at process start so a defective submission aborts before any work
/// is done. Returns the number of registered migrations.
///
/// # Panics
///
/// Panics if a submitted migration has a malformed identity or a duplicate version.
pub fn init() -> usize {
    GLOBAL.read().registry.len()
}

/// Register a migration named `<version>_<description>` in the global registry.
pub fn register<U, UFut, D, DFut>(identifier: &str, up: Option<U>, down: Option<D>) -> MigrateResult<()>
where
    U: Fn(RedisStore) -> UFut + Send + Sync + 'static,
    UFut: Future<Output = MigrateResult<()>> + Send + 'static,
    D: Fn(RedisStore) -> DFut + Send + Sync + 'static,
    DFut: Future<Output = MigrateResult<()>> + Send + 'static,
{
    GLOBAL.write().registry.register(identifier, up, down)
}

/// Register a migration named after its source file, typically `file!()`.
pub fn register_source<U, UFut, D, DFut>(path: &str, up: Option<U>, down: Option<D>) -> MigrateResult<()>
where
    U: Fn(RedisStore) -> UFut + Send + Sync + 'static,
    UFut: Future<Output = MigrateResult<()>> + Send + 'static,
    D: Fn(RedisStore) -> DFut + Send + Sync + 'static,
    DFut: Future<Output = MigrateResult<()>> + Send + 'static,
{
    GLOBAL.write().registry.register_source(path, up, down)
}

/// Like [`register`] but panics on errors.
///
/// # Panics
///
/// Panics if the identifier is malformed or the version is already registered.
#[track_caller]
pub fn must_register<U, UFut, D, DFut>(identifier: &str, up: Option<U>, down: Option<D>)
where
    U: Fn(RedisStore) -> UFut + Send + Sync + 'static,
    UFut: Future<Output = MigrateResult<()>> + Send + 'static,
    D: Fn(RedisStore) -> DFut + Send + Sync + 'static,
    DFut: Future<Output = MigrateResult<()>> + Send + 'static,
{
    let result = GLOBAL.write().registry.register(identifier, up, down);
    if let Err(err) = result {
        panic!("failed to register migration: {err}");
    }
}

/// Copy of every globally registered migration, in registration order.
pub fn registered_migrations() -> Vec<Migration<RedisStore>> {
    GLOBAL.read().registry.migrations()
}

/// Attach the database used by [`version`], [`up`] and [`down`].
pub fn set_database(store: RedisStore) {
    GLOBAL.write().store = Some(store);
}

/// Change the ledger collection name. Defaults to `migrations`.
pub fn set_migrations_collection(name: impl Into<String>) {
    GLOBAL.write().migrations_collection = name.into();
}

/// Current database version of the global database.
pub async fn version() -> MigrateResult<(u64, String)> {
    let migrator = GLOBAL.read().migrator()?;
    migrator.version().await
}

/// Run up migrations from the global registry. See [`Migrator::up`].
pub async fn up(n: i64) -> MigrateResult<MigrationStats> {
    let mut migrator = GLOBAL.read().migrator()?;
    migrator.up(n).await
}

/// Run down migrations from the global registry. See [`Migrator::down`].
pub async fn down(n: i64) -> MigrateResult<MigrationStats> {
    let mut migrator = GLOBAL.read().migrator()?;
    migrator.down(n).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn noop(_: RedisStore) -> BoxFuture<'static, MigrateResult<()>> {
        async { Ok(()) }.boxed()
    }

    #[test]
    fn test_static_identifier_registration() {
        let mut registry = Registry::new();
        StaticMigration::new("3_static", Some(noop), None)
            .register_into(&mut registry)
            .unwrap();

        let migrations = registry.migrations();
        assert_eq!(migrations[0].version, 3);
        assert_eq!(migrations[0].description, "static");
        assert!(migrations[0].down.is_none());
    }

    #[test]
    fn test_static_source_registration() {
        let mut registry = Registry::new();
        StaticMigration::from_source("migrations/4_from_file.rs", Some(noop), Some(noop))
            .register_into(&mut registry)
            .unwrap();
        assert!(registry.contains(4));

        let err = StaticMigration::from_source(file!(), Some(noop), Some(noop))
            .register_into(&mut registry)
            .unwrap_err();
        assert!(matches!(err, MigrateError::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_migrator_requires_database() {
        let state = GlobalState {
            registry: Registry::new(),
            store: None,
            migrations_collection: DEFAULT_MIGRATIONS_COLLECTION.to_string(),
        };
        assert!(matches!(state.migrator(), Err(MigrateError::DatabaseNotSet)));
    }
}
