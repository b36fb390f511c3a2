//! In-process document store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::MigrationStore;
use crate::errors::{MigrateError, MigrateResult};
use crate::ledger::VersionRecord;

#[derive(Debug, Default)]
struct Collection {
    documents: Vec<Value>,
    indexes: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, Collection>,
    fail_writes: bool,
}

/// Document store kept entirely in memory.
///
/// Collections hold JSON documents in insertion order plus a set of named
/// indexes. Clones share the same underlying state, so a clone handed to a
/// migration action writes to the same database the caller inspects.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a store error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.state.lock().collections.keys().cloned().collect()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.state.lock().collections.contains_key(name)
    }

    /// Drop a collection with its documents and indexes. Returns whether it existed.
    pub fn drop_collection(&self, name: &str) -> bool {
        self.state.lock().collections.remove(name).is_some()
    }

    /// Append a document, creating the collection on first use.
    pub fn insert_document(&self, collection: &str, document: Value) -> MigrateResult<()> {
        let mut state = self.state.lock();
        check_writable(&state)?;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .documents
            .push(document);
        Ok(())
    }

    /// Documents whose top-level `field` equals `value`.
    pub fn find_documents(&self, collection: &str, field: &str, value: &Value) -> Vec<Value> {
        let state = self.state.lock();
        state
            .collections
            .get(collection)
            .map(|coll| {
                coll.documents
                    .iter()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Delete documents whose top-level `field` equals `value`. Returns the number removed.
    pub fn delete_documents(&self, collection: &str, field: &str, value: &Value) -> MigrateResult<usize> {
        let mut state = self.state.lock();
        check_writable(&state)?;
        let Some(coll) = state.collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = coll.documents.len();
        coll.documents.retain(|doc| doc.get(field) != Some(value));
        Ok(before - coll.documents.len())
    }

    pub fn count_documents(&self, collection: &str) -> usize {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|coll| coll.documents.len())
            .unwrap_or(0)
    }

    /// Create a named index. Fails if the collection already has one by that name.
    pub fn create_index(&self, collection: &str, name: &str) -> MigrateResult<()> {
        let mut state = self.state.lock();
        check_writable(&state)?;
        let coll = state.collections.entry(collection.to_string()).or_default();
        if !coll.indexes.insert(name.to_string()) {
            return Err(MigrateError::store(format!(
                "index {name} already exists on {collection}"
            )));
        }
        Ok(())
    }

    /// Drop a named index. Fails if it does not exist.
    pub fn drop_index(&self, collection: &str, name: &str) -> MigrateResult<()> {
        let mut state = self.state.lock();
        check_writable(&state)?;
        let removed = state
            .collections
            .get_mut(collection)
            .is_some_and(|coll| coll.indexes.remove(name));
        if !removed {
            return Err(MigrateError::store(format!("index {name} not found on {collection}")));
        }
        Ok(())
    }

    pub fn index_names(&self, collection: &str) -> Vec<String> {
        self.state
            .lock()
            .collections
            .get(collection)
            .map(|coll| coll.indexes.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn check_writable(state: &MemoryState) -> MigrateResult<()> {
    if state.fail_writes {
        return Err(MigrateError::store("writes are disabled"));
    }
    Ok(())
}

impl MigrationStore for MemoryStore {
    async fn ensure_collection(&self, name: &str) -> MigrateResult<()> {
        self.state.lock().collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn insert_record(&self, collection: &str, record: &VersionRecord) -> MigrateResult<()> {
        let document = serde_json::to_value(record)?;
        self.insert_document(collection, document)
    }

    async fn find_latest_record(&self, collection: &str) -> MigrateResult<Option<VersionRecord>> {
        let latest = {
            let state = self.state.lock();
            state
                .collections
                .get(collection)
                .and_then(|coll| coll.documents.last().cloned())
        };

        match latest {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    async fn list_records(&self, collection: &str) -> MigrateResult<Vec<VersionRecord>> {
        let documents = {
            let state = self.state.lock();
            state
                .collections
                .get(collection)
                .map(|coll| coll.documents.clone())
                .unwrap_or_default()
        };

        documents
            .into_iter()
            .map(|document| serde_json::from_value(document).map_err(MigrateError::from))
            .collect()
    }
}
