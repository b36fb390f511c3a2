use std::sync::atomic::{AtomicUsize, Ordering};

use docmigrate::RedisStore;

static NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
}

/// Store under a namespace no other test run shares.
pub async fn isolated_store(prefix: &str) -> RedisStore {
    let suffix = NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let namespace = format!("{prefix}_{}_{suffix}", std::process::id());
    RedisStore::connect(&redis_url(), namespace).await.expect("redis store")
}
