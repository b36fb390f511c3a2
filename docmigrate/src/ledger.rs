//! Persisted version history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection used for the ledger unless configured otherwise.
pub const DEFAULT_MIGRATIONS_COLLECTION: &str = "migrations";

/// One ledger entry. Each applied up or down step appends one of these; the
/// latest-inserted entry is the current database version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl VersionRecord {
    /// Record stamped with the current UTC time.
    pub fn now(version: u64, description: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}
