//! Migration runner replaying registered migrations against a store.
//!
//! The current database version is the latest-inserted ledger record. Every
//! successful up step appends its own version; every successful down step
//! appends the version of the migration just below the reverted one.

use std::fmt;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::DocmigrateConfig;
use crate::errors::MigrateResult;
use crate::ledger::{DEFAULT_MIGRATIONS_COLLECTION, VersionRecord};
use crate::migration::{Migration, MigrationFn, sort_migrations};
use crate::registry::Registry;
use crate::store::MigrationStore;

/// Use in [`Migrator::up`] or [`Migrator::down`] to run all available migrations.
pub const ALL_AVAILABLE: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// One step of a replay plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    pub direction: Direction,
    /// Version of the migration whose action runs
    pub version: u64,
    pub description: String,
    /// Version written to the ledger once the action succeeds
    pub record_version: u64,
    pub record_description: String,
}

/// Statistics from a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStats {
    /// Versions whose action ran, in execution order
    pub applied: Vec<u64>,
    /// Current version after the run
    pub final_version: u64,
    pub total_time_ms: u64,
}

impl MigrationStats {
    pub fn migrations_applied(&self) -> usize {
        self.applied.len()
    }
}

/// Performs migrations against a store.
///
/// The database is versioned through a dedicated ledger collection. Each
/// applied up or down step appends a record holding version, description
/// and timestamp.
pub struct Migrator<S> {
    store: S,
    migrations: Vec<Migration<S>>,
    migrations_collection: String,
}

impl<S> fmt::Debug for Migrator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("migrations", &self.migrations)
            .field("migrations_collection", &self.migrations_collection)
            .finish()
    }
}

impl<S: MigrationStore> Migrator<S> {
    pub fn new(store: S, registry: &Registry<S>) -> Self {
        Self::with_migrations(store, registry.migrations())
    }

    /// Build a migrator directly from a list of migrations.
    ///
    /// Uniqueness is not re-checked here; build a [`Registry`] first when the
    /// list comes from untrusted registration.
    pub fn with_migrations(store: S, migrations: Vec<Migration<S>>) -> Self {
        Self {
            store,
            migrations,
            migrations_collection: DEFAULT_MIGRATIONS_COLLECTION.to_string(),
        }
    }

    /// Apply the ledger settings of a loaded configuration.
    pub fn from_config(store: S, registry: &Registry<S>, config: &DocmigrateConfig) -> Self {
        Self::new(store, registry).with_collection(config.ledger.collection.clone())
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.migrations_collection = name.into();
        self
    }

    /// Replace the name of the ledger collection. Defaults to `migrations`.
    pub fn set_migrations_collection(&mut self, name: impl Into<String>) {
        self.migrations_collection = name.into();
    }

    pub fn migrations_collection(&self) -> &str {
        &self.migrations_collection
    }

    pub fn set_store(&mut self, store: S) {
        self.store = store;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current database version and description.
    ///
    /// Returns `(0, "")` when nothing has been recorded yet.
    pub async fn version(&self) -> MigrateResult<(u64, String)> {
        self.store.ensure_collection(&self.migrations_collection).await?;

        match self.store.find_latest_record(&self.migrations_collection).await? {
            Some(record) => Ok((record.version, record.description)),
            None => Ok((0, String::new())),
        }
    }

    /// Forcibly record `version` as the current database version.
    pub async fn set_version(&self, version: u64, description: &str) -> MigrateResult<()> {
        let record = VersionRecord::now(version, description);
        self.store.insert_record(&self.migrations_collection, &record).await
    }

    /// Every ledger record, oldest first.
    pub async fn history(&self) -> MigrateResult<Vec<VersionRecord>> {
        self.store.ensure_collection(&self.migrations_collection).await?;
        self.store.list_records(&self.migrations_collection).await
    }

    /// Steps [`Migrator::up`] would perform, without running anything.
    pub async fn plan_up(&mut self, n: i64) -> MigrateResult<Vec<MigrationStep>> {
        let (current_version, _) = self.version().await?;
        sort_migrations(&mut self.migrations);
        Ok(self
            .up_candidates(current_version, n)
            .into_iter()
            .map(|(_, step)| step)
            .collect())
    }

    /// Steps [`Migrator::down`] would perform, without running anything.
    pub async fn plan_down(&mut self, n: i64) -> MigrateResult<Vec<MigrationStep>> {
        let (current_version, _) = self.version().await?;
        sort_migrations(&mut self.migrations);
        Ok(self
            .down_candidates(current_version, n)
            .into_iter()
            .map(|(_, step)| step)
            .collect())
    }

    /// Perform up migrations.
    ///
    /// If `n <= 0` every pending migration with a newer version runs.
    /// If `n > 0` at most `n` of them run.
    pub async fn up(&mut self, n: i64) -> MigrateResult<MigrationStats> {
        let (current_version, _) = self.version().await?;
        sort_migrations(&mut self.migrations);
        let plan = self.up_candidates(current_version, n);
        debug!("{} up migration(s) pending above version {current_version}", plan.len());
        self.execute(plan, current_version).await
    }

    /// Perform down migrations.
    ///
    /// If `n <= 0` every applied migration with a down action is reverted.
    /// If `n > 0` at most `n` of them are reverted.
    pub async fn down(&mut self, n: i64) -> MigrateResult<MigrationStats> {
        let (current_version, _) = self.version().await?;
        sort_migrations(&mut self.migrations);
        let plan = self.down_candidates(current_version, n);
        debug!("{} down migration(s) eligible at version {current_version}", plan.len());
        self.execute(plan, current_version).await
    }

    async fn execute(
        &self,
        plan: Vec<(MigrationFn<S>, MigrationStep)>,
        start_version: u64,
    ) -> MigrateResult<MigrationStats> {
        let start_time = Instant::now();
        let mut stats = MigrationStats {
            final_version: start_version,
            ..Default::default()
        };

        for (action, step) in plan {
            if let Err(err) = action(self.store.clone()).await {
                warn!(
                    "migration {} {} failed, database left at version {}: {err}",
                    step.direction, step.version, stats.final_version
                );
                return Err(err);
            }

            info!("migrated {}: {} {}", step.direction, step.version, step.description);
            self.set_version(step.record_version, &step.record_description).await?;

            stats.applied.push(step.version);
            stats.final_version = step.record_version;
        }

        stats.total_time_ms = elapsed_ms(start_time);
        Ok(stats)
    }

    fn up_candidates(&self, current_version: u64, n: i64) -> Vec<(MigrationFn<S>, MigrationStep)> {
        let limit = clamp_limit(n, self.migrations.len());

        self.migrations
            .iter()
            .filter(|migration| migration.version > current_version)
            .filter_map(|migration| {
                let action = migration.up.clone()?;
                Some((
                    action,
                    MigrationStep {
                        direction: Direction::Up,
                        version: migration.version,
                        description: migration.description.clone(),
                        record_version: migration.version,
                        record_description: migration.description.clone(),
                    },
                ))
            })
            .take(limit)
            .collect()
    }

    fn down_candidates(&self, current_version: u64, n: i64) -> Vec<(MigrationFn<S>, MigrationStep)> {
        let limit = clamp_limit(n, self.migrations.len());

        self.migrations
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, migration)| migration.version <= current_version)
            .filter_map(|(index, migration)| {
                let action = migration.down.clone()?;
                let (record_version, record_description) = match index.checked_sub(1) {
                    Some(prev) => {
                        let previous = &self.migrations[prev];
                        (previous.version, previous.description.clone())
                    }
                    None => (0, String::new()),
                };
                Some((
                    action,
                    MigrationStep {
                        direction: Direction::Down,
                        version: migration.version,
                        description: migration.description.clone(),
                        record_version,
                        record_description,
                    },
                ))
            })
            .take(limit)
            .collect()
    }
}

fn elapsed_ms(start_time: Instant) -> u64 {
    u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn clamp_limit(n: i64, total: usize) -> usize {
    if n <= 0 {
        return total;
    }
    usize::try_from(n).map_or(total, |n| n.min(total))
}
