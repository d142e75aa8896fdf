pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueStore;
use crate::core::config::AppConfig;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the persistent rate store under `{data_path}/cache`, falling back
/// to memory when it cannot be opened.
pub fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let opened = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("cache")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Persistent cache unavailable, rates will not be kept between runs");
            Arc::new(MemoryStore::new())
        }
    }
}
