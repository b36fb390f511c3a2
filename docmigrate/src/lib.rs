//! Versioned migrations for document databases.
//!
//! Register ordered, reversible migrations in a [`Registry`], bind a
//! [`Migrator`] to a store and replay them up or down. Applied versions are
//! tracked in an append-only ledger collection; the latest entry is the
//! current database version.
//!
//! ```ignore
//! use docmigrate::{ALL_AVAILABLE, MemoryStore, Migrator, Registry, no_action};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     "1_seed_catalog",
//!     Some(|store: MemoryStore| async move { store.insert_document("catalog", serde_json::json!({"a": "b"})) }),
//!     no_action(),
//! )?;
//!
//! let mut migrator = Migrator::new(MemoryStore::new(), &registry);
//! migrator.up(ALL_AVAILABLE).await?;
//! ```
//!
//! For application-wide registration see [`global`] and [`submit_migration!`].

pub mod config;
pub mod errors;
pub mod global;
pub mod identifier;
pub mod keys;
pub mod ledger;
pub mod migration;
pub mod registry;
pub mod runner;
pub mod store;

mod macros;

pub use config::DocmigrateConfig;
pub use errors::{MigrateError, MigrateResult};
pub use ledger::{DEFAULT_MIGRATIONS_COLLECTION, VersionRecord};
pub use migration::{Migration, MigrationFn};
pub use registry::{Registry, no_action};
pub use runner::{ALL_AVAILABLE, Direction, MigrationStats, MigrationStep, Migrator};
pub use store::{DocumentInfo, MemoryStore, MigrationStore, RedisStore};

// Re-export redis types so users don't need to depend on a specific redis version
pub use redis;
pub use redis::aio::ConnectionManager;

// Re-exported for `submit_migration!`
pub use inventory;
