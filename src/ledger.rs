//! Key-value ledger contract consumed by the engine, plus an in-memory backend
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),
    #[error("key {key} changed since it was read")]
    Conflict { key: String },
    #[error("ledger lock poisoned")]
    Poisoned,
}

/// The key-value calls the engine makes against the ledger.
///
/// The engine writes through [`LedgerStore::put_if_unchanged`], passing the
/// bytes its own `get` returned (`None` when the key was absent). Stores shared
/// between concurrent callers must fail that write with
/// [`LedgerError::Conflict`] when the key no longer holds those bytes, or
/// serialize writers per key. The default falls back to `put`, which is
/// last-writer-wins.
pub trait LedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    fn put_if_unchanged(
        &self,
        key: &str,
        _observed: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        self.put(key, value)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get(key)
    }
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        (**self).put(key, value)
    }
    fn put_if_unchanged(
        &self,
        key: &str,
        observed: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        (**self).put_if_unchanged(key, observed, value)
    }
}

impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        (**self).get(key)
    }
    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        (**self).put(key, value)
    }
    fn put_if_unchanged(
        &self,
        key: &str,
        observed: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        (**self).put_if_unchanged(key, observed, value)
    }
}

/// In-process map. Conditional writes are checked under the write lock.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerStore for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let entries = self.entries.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().map_err(|_| LedgerError::Poisoned)?;
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn put_if_unchanged(
        &self,
        key: &str,
        observed: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().map_err(|_| LedgerError::Poisoned)?;
        if entries.get(key).map(Vec::as_slice) != observed {
            return Err(LedgerError::Conflict {
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_for_unknown_key() {
        let ledger = MemoryLedger::new();

        assert_eq!(ledger.get("missing").unwrap(), None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn put_overwrites_and_counts_writes() {
        let ledger = MemoryLedger::new();

        ledger.put("k", b"one".to_vec()).unwrap();
        ledger.put("k", b"two".to_vec()).unwrap();

        assert_eq!(ledger.get("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.write_count(), 2);
    }

    #[test]
    fn conditional_write_checks_observed_bytes() {
        let ledger = MemoryLedger::new();

        ledger.put_if_unchanged("k", None, b"one".to_vec()).unwrap();
        let err = ledger.put_if_unchanged("k", None, b"again".to_vec()).unwrap_err();
        assert!(matches!(err, LedgerError::Conflict { .. }));

        ledger
            .put_if_unchanged("k", Some(&b"one"[..]), b"two".to_vec())
            .unwrap();
        assert!(
            ledger
                .put_if_unchanged("k", Some(&b"one"[..]), b"three".to_vec())
                .is_err()
        );

        assert_eq!(ledger.get("k").unwrap(), Some(b"two".to_vec()));
        assert_eq!(ledger.write_count(), 2);
    }

    #[test]
    fn shared_through_arc_and_reference() {
        let ledger = Arc::new(MemoryLedger::new());
        let by_ref = &*ledger;

        by_ref.put("k", b"v".to_vec()).unwrap();

        assert_eq!(LedgerStore::get(&ledger, "k").unwrap(), Some(b"v".to_vec()));
    }
}
