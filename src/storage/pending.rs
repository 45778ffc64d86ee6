use std::sync::Arc;

use log::warn;

use super::KeyValueStore;
use crate::config::PENDING_TARGET_KEY;

/// Single-slot durable record of the last notification target.
///
/// Last write wins and there is never more than one value. Storage errors
/// are logged and read as "nothing pending".
#[derive(Clone)]
pub struct PendingTargetStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PendingTargetStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn save(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        if let Err(err) = self.kv.set(PENDING_TARGET_KEY, url).await {
            warn!("[shell:store] failed to save pending target: {err}");
        }
    }

    pub async fn load(&self) -> Option<String> {
        match self.kv.get(PENDING_TARGET_KEY).await {
            Ok(value) => value.filter(|url| !url.is_empty()),
            Err(err) => {
                warn!("[shell:store] failed to read pending target: {err}");
                None
            }
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.kv.remove(PENDING_TARGET_KEY).await {
            warn!("[shell:store] failed to clear pending target: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::tests::BrokenKvStore;
    use crate::storage::MemoryKvStore;

    fn store() -> PendingTargetStore {
        PendingTargetStore::new(Arc::new(MemoryKvStore::default()))
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = store();
        store.save("https://selftest.example/a").await;
        assert_eq!(store.load().await.as_deref(), Some("https://selftest.example/a"));
        // Reading does not consume.
        assert_eq!(store.load().await.as_deref(), Some("https://selftest.example/a"));
    }

    #[tokio::test]
    async fn clear_then_load_is_empty() {
        let store = store();
        store.save("https://selftest.example/a").await;
        store.clear().await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = store();
        store.save("https://selftest.example/a").await;
        store.save("https://selftest.example/a").await;
        store.save("https://selftest.example/b").await;
        assert_eq!(store.load().await.as_deref(), Some("https://selftest.example/b"));
        store.clear().await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn empty_url_is_not_saved() {
        let store = store();
        store.save("https://selftest.example/a").await;
        store.save("").await;
        assert_eq!(store.load().await.as_deref(), Some("https://selftest.example/a"));
    }

    #[tokio::test]
    async fn storage_failures_read_as_absent() {
        let store = PendingTargetStore::new(Arc::new(BrokenKvStore));
        store.save("https://selftest.example/a").await;
        assert_eq!(store.load().await, None);
        store.clear().await;
    }
}
