//! Durable ledger backed by sled
use super::config::LedgerConfig;
use super::ledger::{LedgerError, LedgerStore};
use std::sync::Arc;

/// A [`LedgerStore`] over a sled tree.
///
/// Conditional writes are a sled compare-and-swap against the bytes the
/// caller read, so a write based on a stale read fails with
/// [`LedgerError::Conflict`]. The handle itself holds no per-read state and
/// can be shared freely between services and threads.
pub struct SledLedger {
    instance: Arc<sled::Db>,
    flush_on_write: bool,
}

impl SledLedger {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            instance,
            flush_on_write: false,
        }
    }

    pub fn open(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let db = config.to_sled().open()?;
        tracing::debug!(path = %config.path.display(), "opened sled ledger");

        Ok(Self {
            instance: Arc::new(db),
            flush_on_write: config.flush_on_write,
        })
    }

    /// The underlying database, e.g. to hand a second ledger handle to
    /// another worker.
    pub fn db(&self) -> Arc<sled::Db> {
        Arc::clone(&self.instance)
    }

    fn flush_if_configured(&self) -> Result<(), LedgerError> {
        if self.flush_on_write {
            self.instance.flush()?;
        }
        Ok(())
    }
}

impl LedgerStore for SledLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.instance.get(key)?.map(|v| v.to_vec()))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        self.instance.insert(key, value)?;
        self.flush_if_configured()
    }

    fn put_if_unchanged(
        &self,
        key: &str,
        observed: Option<&[u8]>,
        value: Vec<u8>,
    ) -> Result<(), LedgerError> {
        self.instance
            .compare_and_swap(key, observed, Some(value))?
            .map_err(|_| LedgerError::Conflict {
                key: key.to_string(),
            })?;
        self.flush_if_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_ledger() -> (TempDir, SledLedger) {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig {
            flush_on_write: true,
            ..LedgerConfig::at(dir.path().join("ledger.db"))
        };
        (dir, SledLedger::open(&config).unwrap())
    }

    #[test]
    fn read_then_write_succeeds() {
        let (_dir, ledger) = temp_ledger();

        let seen = ledger.get("k").unwrap();
        assert_eq!(seen, None);
        ledger.put_if_unchanged("k", None, b"v1".to_vec()).unwrap();

        let seen = ledger.get("k").unwrap();
        ledger
            .put_if_unchanged("k", seen.as_deref(), b"v2".to_vec())
            .unwrap();

        assert_eq!(ledger.get("k").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn stale_write_is_rejected_on_a_shared_handle() {
        let (_dir, ledger) = temp_ledger();
        let ledger = Arc::new(ledger);
        ledger.put("k", b"v0".to_vec()).unwrap();

        // two cycles read the same version through the same handle
        let first = ledger.get("k").unwrap();
        let second = ledger.get("k").unwrap();

        ledger
            .put_if_unchanged("k", first.as_deref(), b"from-first".to_vec())
            .unwrap();
        let err = ledger
            .put_if_unchanged("k", second.as_deref(), b"from-second".to_vec())
            .unwrap_err();

        assert!(matches!(err, LedgerError::Conflict { ref key } if key == "k"));
        assert_eq!(ledger.get("k").unwrap(), Some(b"from-first".to_vec()));
    }

    #[test]
    fn concurrent_creation_of_the_same_key_conflicts() {
        let (_dir, first) = temp_ledger();
        let second = SledLedger::new(first.db());

        assert_eq!(first.get("new").unwrap(), None);
        assert_eq!(second.get("new").unwrap(), None);

        first.put_if_unchanged("new", None, b"a".to_vec()).unwrap();
        assert!(second.put_if_unchanged("new", None, b"b".to_vec()).is_err());
    }

    #[test]
    fn reads_do_not_constrain_later_plain_writes() {
        let (_dir, ledger) = temp_ledger();
        ledger.put("k", b"v0".to_vec()).unwrap();

        for _ in 0..3 {
            ledger.get("k").unwrap();
        }
        SledLedger::new(ledger.db()).put("k", b"v1".to_vec()).unwrap();

        ledger.put("k", b"v2".to_vec()).unwrap();
        assert_eq!(ledger.get("k").unwrap(), Some(b"v2".to_vec()));
    }
}
