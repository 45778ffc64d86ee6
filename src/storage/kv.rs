use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[cfg(target_os = "macos")]
const PLATFORM_STORE_SEGMENTS: &[&str] = &["Library", "Application Support", "Selftest"];
#[cfg(not(target_os = "macos"))]
const PLATFORM_STORE_SEGMENTS: &[&str] = &[".config", "selftest"];

const STORE_FILE_NAME: &str = "storage.json";

pub fn default_store_path() -> Result<PathBuf> {
    let mut path = dirs::home_dir().ok_or_else(|| anyhow!("No home directory"))?;
    for segment in PLATFORM_STORE_SEGMENTS {
        path.push(segment);
    }
    path.push(STORE_FILE_NAME);
    Ok(path)
}

/// JSON object on disk, rewritten in full on every change.
#[derive(Clone)]
pub struct FileKvStore {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
}

type Entries = BTreeMap<String, String>;

impl FileKvStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries> {
        match fs::read(&self.path).await {
            // A corrupt file is treated as empty rather than wedging the store.
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_default()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        fs::write(&self.path, bytes).await?;
        Ok(())
    }

    async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries) -> bool + Send,
    {
        let _lock = self.guard.lock().await;
        let mut entries = self.read_entries().await?;
        if f(&mut entries) {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _lock = self.guard.lock().await;
        let entries = self.read_entries().await?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            let previous = entries.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some()).await
    }
}

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: parking_lot::Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.lock().remove(key);
        Ok(())
    }
}
