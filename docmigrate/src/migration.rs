use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::errors::MigrateResult;

/// Boxed action invoked with a clone of the store handle.
pub type MigrationFn<S> = Arc<dyn Fn(S) -> BoxFuture<'static, MigrateResult<()>> + Send + Sync>;

/// A single versioned database migration.
///
/// - `version`: unique within a registry, used as sort key and ledger identity
/// - `description`: free text, may be empty
/// - `up`: applied when migrating forward
/// - `down`: applied when reverting; `None` makes the migration forward-only
pub struct Migration<S> {
    pub version: u64,
    pub description: String,
    pub up: Option<MigrationFn<S>>,
    pub down: Option<MigrationFn<S>>,
}

impl<S: 'static> Migration<S> {
    pub fn new(version: u64, description: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: None,
            down: None,
        }
    }

    /// Attach the forward action.
    pub fn with_up<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        self.up = Some(boxed_action(action));
        self
    }

    /// Attach the reverse action.
    pub fn with_down<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        self.down = Some(boxed_action(action));
        self
    }

    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

impl<S> Clone for Migration<S> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            description: self.description.clone(),
            up: self.up.clone(),
            down: self.down.clone(),
        }
    }
}

impl<S> fmt::Debug for Migration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("description", &self.description)
            .field("up", &self.up.is_some())
            .field("down", &self.down.is_some())
            .finish()
    }
}

pub(crate) fn boxed_action<S, F, Fut>(action: F) -> MigrationFn<S>
where
    S: 'static,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MigrateResult<()>> + Send + 'static,
{
    Arc::new(move |store: S| action(store).boxed())
}

pub(crate) fn sort_migrations<S>(migrations: &mut [Migration<S>]) {
    migrations.sort_by_key(|migration| migration.version);
}

pub(crate) fn has_version<S>(migrations: &[Migration<S>], version: u64) -> bool {
    migrations.iter().any(|migration| migration.version == version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MigrateError;

    fn bare(version: u64) -> Migration<()> {
        Migration::new(version, version.to_string())
    }

    #[test]
    fn test_migration_sort() {
        let mut migrations = vec![bare(10), bare(2), bare(4), bare(8)];
        sort_migrations(&mut migrations);
        let versions: Vec<u64> = migrations.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![2, 4, 8, 10]);
    }

    #[test]
    fn test_has_version() {
        let migrations = vec![bare(10), bare(2), bare(4), bare(8)];
        assert!(has_version(&migrations, 2));
        assert!(!has_version(&migrations, 3));
    }

    #[test]
    fn test_builder_sets_actions() {
        let migration: Migration<()> = Migration::new(1, "hello").with_up(|_| async { Ok::<(), MigrateError>(()) });
        assert!(migration.up.is_some());
        assert!(!migration.is_reversible());

        let debug = format!("{migration:?}");
        assert!(debug.contains("version: 1"));
        assert!(debug.contains("up: true"));
        assert!(debug.contains("down: false"));
    }

    #[tokio::test]
    async fn test_boxed_action_receives_store() {
        let migration: Migration<u32> = Migration::new(1, "hello").with_down(|store| async move {
            assert_eq!(store, 42);
            Ok::<(), MigrateError>(())
        });
        let down = migration.down.clone().unwrap();
        down(42).await.unwrap();
    }
}
