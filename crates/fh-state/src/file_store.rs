//! JSON file store
//!
//! Keeps the whole key map in memory and rewrites the file on every `set`.
//! A missing or unreadable file starts an empty map.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::StoreResult;
use crate::store::BalanceStore;

/// Balance store backed by a JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, u64>>,
}

impl JsonFileStore {
    /// Open the store at its standard location
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Open a store at `path`, loading whatever is already there
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let cache = match Self::read_map(&path) {
            Ok(map) => {
                log::info!("Loaded {} stored value(s) from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                if path.exists() {
                    log::warn!("Ignoring unreadable store {}: {}", path.display(), e);
                }
                BTreeMap::new()
            }
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    /// Get default store file path
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("FortuneHall"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("balance.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(path: &Path) -> StoreResult<BTreeMap<String, u64>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_map(&self, map: &BTreeMap<String, u64>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl BalanceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.cache.read().get(key).copied()
    }

    fn set(&self, key: &str, value: u64) -> StoreResult<()> {
        let mut cache = self.cache.write();
        cache.insert(key.to_string(), value);
        self.write_map(&cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BALANCE_KEY;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("fh_state_test")
            .join(format!("{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_path("missing");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(BALANCE_KEY), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let store = JsonFileStore::open(&path);
            store.set(BALANCE_KEY, 2350).unwrap();
        }

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(BALANCE_KEY), Some(2350));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(BALANCE_KEY), None);

        store.set(BALANCE_KEY, 10).unwrap();
        assert_eq!(JsonFileStore::open(&path).get(BALANCE_KEY), Some(10));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(JsonFileStore::default_path().ends_with("balance.json"));
    }
}
