mod device;
mod kv;
mod pending;

pub use device::device_id;
pub use kv::{default_store_path, FileKvStore, KeyValueStore, MemoryKvStore};
pub use pending::PendingTargetStore;
