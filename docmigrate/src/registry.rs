use std::future::Future;

use crate::errors::{MigrateError, MigrateResult};
use crate::identifier::{parse_identifier, parse_source_path};
use crate::migration::{Migration, boxed_action, has_version};

/// Ordered-by-insertion collection of migrations with unique versions.
///
/// The registry never sorts itself; [`Migrator`](crate::Migrator) sorts a
/// copy right before replaying.
pub struct Registry<S> {
    migrations: Vec<Migration<S>>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self { migrations: Vec::new() }
    }
}

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            migrations: self.migrations.clone(),
        }
    }
}

impl<S> std::fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.migrations).finish()
    }
}

impl<S: 'static> Registry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from pre-built migrations, rejecting duplicate versions.
    pub fn from_migrations<I>(migrations: I) -> MigrateResult<Self>
    where
        I: IntoIterator<Item = Migration<S>>,
    {
        let mut registry = Self::new();
        for migration in migrations {
            registry.add(migration)?;
        }
        Ok(registry)
    }

    /// Append a pre-built migration.
    pub fn add(&mut self, migration: Migration<S>) -> MigrateResult<()> {
        if has_version(&self.migrations, migration.version) {
            return Err(MigrateError::DuplicateVersion {
                version: migration.version,
            });
        }
        self.migrations.push(migration);
        Ok(())
    }

    /// Register a migration named `<version>_<description>`.
    ///
    /// Either action may be `None`; pass [`no_action`] for readability.
    pub fn register<U, UFut, D, DFut>(&mut self, identifier: &str, up: Option<U>, down: Option<D>) -> MigrateResult<()>
    where
        U: Fn(S) -> UFut + Send + Sync + 'static,
        UFut: Future<Output = MigrateResult<()>> + Send + 'static,
        D: Fn(S) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        let (version, description) = parse_identifier(identifier)?;
        self.add(build(version, description, up, down))
    }

    /// Register a migration named after its source file, typically `file!()`.
    pub fn register_source<U, UFut, D, DFut>(&mut self, path: &str, up: Option<U>, down: Option<D>) -> MigrateResult<()>
    where
        U: Fn(S) -> UFut + Send + Sync + 'static,
        UFut: Future<Output = MigrateResult<()>> + Send + 'static,
        D: Fn(S) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        let (version, description) = parse_source_path(path)?;
        self.add(build(version, description, up, down))
    }

    /// Like [`Registry::register`] but panics on errors.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is malformed or the version is already
    /// registered. Meant for start-up registration where a broken migration
    /// set is a programming error.
    #[track_caller]
    pub fn must_register<U, UFut, D, DFut>(&mut self, identifier: &str, up: Option<U>, down: Option<D>)
    where
        U: Fn(S) -> UFut + Send + Sync + 'static,
        UFut: Future<Output = MigrateResult<()>> + Send + 'static,
        D: Fn(S) -> DFut + Send + Sync + 'static,
        DFut: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        if let Err(err) = self.register(identifier, up, down) {
            panic!("failed to register migration: {err}");
        }
    }
}

impl<S> Registry<S> {
    /// Defensive copy of the registered migrations, in registration order.
    pub fn migrations(&self) -> Vec<Migration<S>> {
        self.migrations.clone()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn contains(&self, version: u64) -> bool {
        has_version(&self.migrations, version)
    }
}

fn build<S, U, UFut, D, DFut>(version: u64, description: String, up: Option<U>, down: Option<D>) -> Migration<S>
where
    S: 'static,
    U: Fn(S) -> UFut + Send + Sync + 'static,
    UFut: Future<Output = MigrateResult<()>> + Send + 'static,
    D: Fn(S) -> DFut + Send + Sync + 'static,
    DFut: Future<Output = MigrateResult<()>> + Send + 'static,
{
    Migration {
        version,
        description,
        up: up.map(boxed_action),
        down: down.map(boxed_action),
    }
}

/// Placeholder for an absent action in [`Registry::register`].
///
/// ```ignore
/// registry.register("3_drop_legacy", Some(drop_legacy), no_action())?;
/// ```
pub fn no_action<S>() -> Option<fn(S) -> std::future::Ready<MigrateResult<()>>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: ()) -> std::future::Ready<MigrateResult<()>> {
        std::future::ready(Ok(()))
    }

    #[test]
    fn test_register_parses_identifier() {
        let mut registry: Registry<()> = Registry::new();
        registry.register("1_test", Some(noop), Some(noop)).unwrap();

        let migrations = registry.migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].version, 1);
        assert_eq!(migrations[0].description, "test");
        assert!(migrations[0].up.is_some());
        assert!(migrations[0].down.is_some());
    }

    #[test]
    fn test_register_source_uses_file_name() {
        let mut registry: Registry<()> = Registry::new();
        registry
            .register_source("src/migrations/2_sample_index.rs", Some(noop), no_action())
            .unwrap();

        let migrations = registry.migrations();
        assert_eq!(migrations[0].version, 2);
        assert_eq!(migrations[0].description, "sample_index");
        assert!(migrations[0].down.is_none());
    }

    #[test]
    fn test_register_source_rejects_own_file() {
        let mut registry: Registry<()> = Registry::new();
        let err = registry.register_source(file!(), Some(noop), Some(noop)).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidIdentifier { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_version_keeps_first() {
        let mut registry: Registry<()> = Registry::new();
        registry.register("1_first", Some(noop), no_action()).unwrap();

        let err = registry.register("1_second", Some(noop), no_action()).unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateVersion { version: 1 }));

        let migrations = registry.migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].description, "first");
    }

    #[test]
    fn test_from_migrations_rejects_duplicates() {
        let result = Registry::<()>::from_migrations([Migration::new(1, "a"), Migration::new(1, "b")]);
        assert!(matches!(result, Err(MigrateError::DuplicateVersion { version: 1 })));
    }

    #[test]
    fn test_migrations_is_defensive_copy() {
        let mut registry: Registry<()> = Registry::new();
        registry.add(Migration::new(1, "hello")).unwrap();

        let mut copy = registry.migrations();
        copy[0].description = "changed".to_string();
        copy.push(Migration::new(2, "extra"));

        let migrations = registry.migrations();
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].description, "hello");
    }

    #[test]
    fn test_must_register_succeeds() {
        let mut registry: Registry<()> = Registry::new();
        registry.must_register("5_ok", Some(noop), Some(noop));
        assert!(registry.contains(5));
    }

    #[test]
    #[should_panic(expected = "failed to register migration")]
    fn test_must_register_panics_on_bad_identifier() {
        let mut registry: Registry<()> = Registry::new();
        registry.must_register("bad", Some(noop), Some(noop));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_must_register_panics_on_duplicate() {
        let mut registry: Registry<()> = Registry::new();
        registry.must_register("1_a", Some(noop), Some(noop));
        registry.must_register("1_b", Some(noop), Some(noop));
    }
}
