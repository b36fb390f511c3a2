/// Key-construction helpers for Redis-backed collections.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub namespace: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(namespace: &'a str) -> Self {
        Self { namespace }
    }

    /// Key holding a whole collection document (used for the ledger).
    pub fn collection(&self, collection: &str) -> String {
        format!("{}:{}", self.namespace, collection)
    }

    /// Key of a single document inside a collection.
    pub fn document(&self, collection: &str, document_id: &str) -> String {
        format!("{}:{}:{}", self.namespace, collection, document_id)
    }

    /// Prefix shared by every document key of a collection.
    pub fn document_prefix(&self, collection: &str) -> String {
        format!("{}:{}:", self.namespace, collection)
    }

    /// Document ID of a key inside `collection`, or `None` for a foreign key.
    ///
    /// IDs may themselves contain `:`.
    pub fn document_id<'k>(&self, collection: &str, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.document_prefix(collection).as_str())
    }

    /// Fully-qualified RediSearch index name.
    pub fn index(&self, name: &str) -> String {
        format!("{}:idx:{}", self.namespace, name)
    }
}
