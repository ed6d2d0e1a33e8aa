//! Balance store abstraction
//!
//! A key/value surface narrow enough for browser local storage, a file,
//! or a plain map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::StoreResult;

/// Key every game shares for the player balance
pub const BALANCE_KEY: &str = "casinoBalance";

/// Balance used when nothing has been stored yet
pub const DEFAULT_BALANCE: u64 = 1000;

/// Durable integer storage keyed by name
pub trait BalanceStore: Send + Sync {
    /// Stored value, `None` if the key was never written
    fn get(&self, key: &str) -> Option<u64>;

    /// Persist a value
    fn set(&self, key: &str, value: u64) -> StoreResult<()>;

    /// Stored value or `default`
    fn get_or(&self, key: &str, default: u64) -> u64 {
        self.get(key).unwrap_or(default)
    }
}

/// Store shared between sessions
pub type SharedStore = Arc<dyn BalanceStore>;

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one balance
    pub fn with_balance(balance: u64) -> Self {
        let store = Self::new();
        store.values.write().insert(BALANCE_KEY.to_string(), balance);
        store
    }

    /// Wrap for sharing
    pub fn shared(self) -> SharedStore {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl BalanceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.read().get(key).copied()
    }

    fn set(&self, key: &str, value: u64) -> StoreResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_absent_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get(BALANCE_KEY), None);
        assert_eq!(store.get_or(BALANCE_KEY, DEFAULT_BALANCE), 1000);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_set_get() {
        let store = MemoryStore::new();
        store.set(BALANCE_KEY, 750).unwrap();
        assert_eq!(store.get(BALANCE_KEY), Some(750));
        store.set(BALANCE_KEY, 0).unwrap();
        assert_eq!(store.get_or(BALANCE_KEY, DEFAULT_BALANCE), 0);
    }

    #[test]
    fn test_shared_store_visible_across_handles() {
        let shared = MemoryStore::with_balance(400).shared();
        let other = Arc::clone(&shared);
        other.set(BALANCE_KEY, 1200).unwrap();
        assert_eq!(shared.get(BALANCE_KEY), Some(1200));
    }
}
