//! Redis-backed document store.
//!
//! Documents are RedisJSON values stored under `namespace:collection:id`.
//! The ledger is a single JSON document at `namespace:collection` holding a
//! `records` array; appending to that array gives the insertion order the
//! migrator relies on.

use std::fmt;
use std::sync::Arc;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;

use super::MigrationStore;
use crate::errors::MigrateResult;
use crate::keys::KeyContext;
use crate::ledger::VersionRecord;

const EMPTY_LEDGER: &str = r#"{"records":[]}"#;
const SCAN_COUNT: usize = 100;

/// Handle to a Redis database used both for the ledger and by migration actions.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    namespace: Arc<str>,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").field("namespace", &self.namespace).finish()
    }
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: Arc::from(namespace.into()),
        }
    }

    /// Open a managed connection to `redis_url`.
    pub async fn connect(redis_url: &str, namespace: impl Into<String>) -> MigrateResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn keys(&self) -> KeyContext<'_> {
        KeyContext::new(&self.namespace)
    }

    /// A clone of the managed connection for issuing raw commands.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Store `document` under `collection:id`, replacing any previous value.
    pub async fn insert_document(&self, collection: &str, id: &str, document: &Value) -> MigrateResult<()> {
        let key = self.keys().document(collection, id);
        let json = serde_json::to_string(document)?;
        let mut conn = self.connection();
        let _: () = redis::cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(&json)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get_document(&self, collection: &str, id: &str) -> MigrateResult<Option<Value>> {
        let key = self.keys().document(collection, id);
        let mut conn = self.connection();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(&key)
            .arg("$")
            .query_async(&mut conn)
            .await?;

        match raw {
            // JSON.GET with a `$` path returns an array of matches
            Some(json) => {
                let values: Vec<Value> = serde_json::from_str(&json)?;
                Ok(values.into_iter().next())
            }
            None => Ok(None),
        }
    }

    /// Delete a document. Returns whether it existed.
    pub async fn delete_document(&self, collection: &str, id: &str) -> MigrateResult<bool> {
        let key = self.keys().document(collection, id);
        let mut conn = self.connection();
        let deleted: u64 = conn.del(&key).await?;
        Ok(deleted > 0)
    }

    /// Scan up to `limit` documents of a collection.
    pub async fn scan_documents(&self, collection: &str, limit: usize) -> MigrateResult<Vec<DocumentInfo>> {
        let key_context = self.keys();
        let pattern = format!("{}*", key_context.document_prefix(collection));
        let mut conn = self.connection();
        let mut documents = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            for key in keys {
                if documents.len() >= limit {
                    break;
                }
                let Some(id) = key_context.document_id(collection, &key).map(str::to_string) else {
                    continue;
                };

                let raw: Option<String> = redis::cmd("JSON.GET")
                    .arg(&key)
                    .arg("$")
                    .query_async(&mut conn)
                    .await?;

                if let Some(json) = raw {
                    let values: Vec<Value> = serde_json::from_str(&json)?;
                    if let Some(data) = values.into_iter().next() {
                        documents.push(DocumentInfo { id, key, data });
                    }
                }
            }

            cursor = next_cursor;
            if cursor == 0 || documents.len() >= limit {
                break;
            }
        }

        Ok(documents)
    }

    /// Delete every document of a collection. Returns the number of keys removed.
    pub async fn drop_collection(&self, collection: &str) -> MigrateResult<u64> {
        let pattern = format!("{}*", self.keys().document_prefix(collection));
        let mut conn = self.connection();
        let mut cursor: u64 = 0;
        let mut total_deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        let ledger_key = self.keys().collection(collection);
        let deleted: u64 = conn.del(&ledger_key).await?;
        Ok(total_deleted + deleted)
    }

    /// Create a RediSearch index over a collection with TAG fields.
    pub async fn create_index(&self, name: &str, collection: &str, tag_fields: &[&str]) -> MigrateResult<()> {
        let mut command = redis::cmd("FT.CREATE");
        command.arg(self.keys().index(name));
        command.arg("ON").arg("JSON");
        command.arg("PREFIX").arg(1).arg(self.keys().document_prefix(collection));
        command.arg("SCHEMA");
        for field in tag_fields {
            command.arg(format!("$.{field}")).arg("AS").arg(*field).arg("TAG");
        }

        let mut conn = self.connection();
        command.query_async::<()>(&mut conn).await?;
        Ok(())
    }

    pub async fn drop_index(&self, name: &str) -> MigrateResult<()> {
        let mut conn = self.connection();
        let _: () = redis::cmd("FT.DROPINDEX")
            .arg(self.keys().index(name))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Index names in this namespace, without the namespace prefix.
    pub async fn index_names(&self) -> MigrateResult<Vec<String>> {
        let mut conn = self.connection();
        let indexes: Vec<String> = redis::cmd("FT._LIST").query_async(&mut conn).await?;
        let prefix = self.keys().index("");
        Ok(indexes
            .into_iter()
            .filter_map(|name| name.strip_prefix(prefix.as_str()).map(str::to_string))
            .collect())
    }
}

impl MigrationStore for RedisStore {
    async fn ensure_collection(&self, name: &str) -> MigrateResult<()> {
        let key = self.keys().collection(name);
        let mut conn = self.connection();
        // NX leaves an existing ledger untouched
        let _: Option<String> = redis::cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(EMPTY_LEDGER)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn insert_record(&self, collection: &str, record: &VersionRecord) -> MigrateResult<()> {
        // ARRAPPEND fails on a missing key
        self.ensure_collection(collection).await?;

        let key = self.keys().collection(collection);
        let record_json = serde_json::to_string(record)?;
        let mut conn = self.connection();
        let _: redis::Value = redis::cmd("JSON.ARRAPPEND")
            .arg(&key)
            .arg("$.records")
            .arg(&record_json)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_latest_record(&self, collection: &str) -> MigrateResult<Option<VersionRecord>> {
        let key = self.keys().collection(collection);
        let mut conn = self.connection();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(&key)
            .arg("$.records[-1]")
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(json) => {
                let records: Vec<VersionRecord> = serde_json::from_str(&json)?;
                Ok(records.into_iter().next())
            }
            None => Ok(None),
        }
    }

    async fn list_records(&self, collection: &str) -> MigrateResult<Vec<VersionRecord>> {
        let key = self.keys().collection(collection);
        let mut conn = self.connection();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(&key)
            .arg("$.records")
            .query_async(&mut conn)
            .await?;

        match raw {
            Some(json) => {
                let wrapper: Vec<Vec<VersionRecord>> = serde_json::from_str(&json)?;
                Ok(wrapper.into_iter().next().unwrap_or_default())
            }
            None => Ok(Vec::new()),
        }
    }
}

/// A document read back from a collection scan.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    /// Full Redis key
    pub key: String,
    /// Document ID extracted from key
    pub id: String,
    pub data: Value,
}
