// Cache store
// A key-addressed directory tree under the cache root, modeled on
// actions/cache: a cache hit restores files, a miss leaves the caller
// to populate and save them.

use crate::storage::{cache_entry_key, StorageProvider};

use std::path::PathBuf;

pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(storage: &StorageProvider) -> Self {
        Self {
            root: storage.cache_entries_root(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(cache_entry_key(key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key).is_dir()
    }

    /// Directory to restore from, if present.
    pub fn path_for_restore(&self, key: &str) -> Option<PathBuf> {
        let path = self.entry_path(key);
        path.is_dir().then_some(path)
    }

    /// Directory to save into; created if it does not exist yet.
    pub fn path_for_save(&self, key: &str) -> std::io::Result<PathBuf> {
        let path = self.entry_path(key);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_miss_then_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let cache = CacheStore::new(&storage);

        assert!(!cache.exists("deps-v1"));
        assert!(cache.path_for_restore("deps-v1").is_none());

        let saved = cache.path_for_save("deps-v1").unwrap();
        std::fs::write(saved.join("marker"), b"ok").unwrap();

        assert!(cache.exists("deps-v1"));
        let restored = cache.path_for_restore("deps-v1").unwrap();
        assert!(restored.join("marker").exists());
    }

    #[test]
    fn test_distinct_keys_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageProvider::with_root(tmp.path()).unwrap();
        let cache = CacheStore::new(&storage);

        let a = cache.path_for_save("a").unwrap();
        let b = cache.path_for_save("b").unwrap();
        assert_ne!(a, b);
    }
}
