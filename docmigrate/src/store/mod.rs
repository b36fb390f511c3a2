//! Store capabilities consumed by the migrator.
//!
//! - `MemoryStore` - in-process document store
//! - `RedisStore` - RedisJSON/RediSearch backed store

mod memory;
mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::{DocumentInfo, RedisStore};

use crate::errors::MigrateResult;
use crate::ledger::VersionRecord;

/// Ledger operations a document store must provide.
///
/// Implementations are cheap handles: the migrator clones the handle and
/// passes the clone to each migration action.
#[allow(async_fn_in_trait)]
pub trait MigrationStore: Clone + Send + Sync + 'static {
    /// Create the ledger collection if it does not exist yet.
    async fn ensure_collection(&self, name: &str) -> MigrateResult<()>;

    /// Append a ledger record.
    async fn insert_record(&self, collection: &str, record: &VersionRecord) -> MigrateResult<()>;

    /// Latest-inserted ledger record, if any.
    async fn find_latest_record(&self, collection: &str) -> MigrateResult<Option<VersionRecord>>;

    /// Every ledger record in insertion order.
    async fn list_records(&self, collection: &str) -> MigrateResult<Vec<VersionRecord>>;
}
