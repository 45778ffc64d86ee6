use log::warn;

use super::KeyValueStore;
use crate::config::DEVICE_ID_KEY;

const DEVICE_ID_PREFIX: &str = "device-";
const DEVICE_ID_LEN: usize = 8;

/// Returns the persisted device identifier, generating and storing one on
/// first use. A storage failure still yields an id, it just won't survive a
/// restart.
pub async fn device_id(store: &dyn KeyValueStore) -> String {
    match store.get(DEVICE_ID_KEY).await {
        Ok(Some(saved)) if !saved.is_empty() => return saved,
        Ok(_) => {}
        Err(err) => warn!("[shell:store] failed to read device id: {err}"),
    }

    let id = generate_device_id();
    if let Err(err) = store.set(DEVICE_ID_KEY, &id).await {
        warn!("[shell:store] failed to persist device id: {err}");
    }
    id
}

fn generate_device_id() -> String {
    let suffix: String = (0..DEVICE_ID_LEN).map(|_| fastrand::digit(36)).collect();
    format!("{DEVICE_ID_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::tests::BrokenKvStore;
    use crate::storage::MemoryKvStore;

    #[test]
    fn generated_ids_are_base36() {
        let id = generate_device_id();
        let suffix = id.strip_prefix(DEVICE_ID_PREFIX).unwrap();
        assert_eq!(suffix.len(), DEVICE_ID_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[tokio::test]
    async fn id_is_generated_once() {
        let store = MemoryKvStore::default();
        let first = device_id(&store).await;
        let second = device_id(&store).await;
        assert_eq!(first, second);
        assert_eq!(store.get(DEVICE_ID_KEY).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn broken_store_still_yields_id() {
        let id = device_id(&BrokenKvStore).await;
        assert!(id.starts_with(DEVICE_ID_PREFIX));
    }
}
