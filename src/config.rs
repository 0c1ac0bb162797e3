//! Engine and ledger configuration
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Policy knobs for [`crate::service::LoanService`].
///
/// The defaults reproduce the behaviour existing ledger history was written
/// with. Hosts load this from their own configuration source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Amount a new loan's outstanding balance is computed from
    /// (`outstanding = baseline - loan_amount`).
    pub outstanding_baseline: Decimal,

    /// Closed set of statuses `approve_loan` accepts. `None` accepts any string.
    pub approval_statuses: Option<Vec<String>>,

    /// Refuse repayments on loans whose status is `Rejected`.
    pub block_rejected_repayments: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            outstanding_baseline: Decimal::new(100_000, 0),
            approval_statuses: None,
            block_rejected_repayments: false,
        }
    }
}

/// Settings for opening a [`crate::sled_ledger::SledLedger`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
    /// Remove the database when it is dropped.
    pub temporary: bool,
    /// Flush to disk after every write instead of on sled's own schedule.
    pub flush_on_write: bool,
    pub cache_capacity: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("loan_ledger.db"),
            temporary: false,
            flush_on_write: false,
            cache_capacity: 64 * 1024 * 1024,
        }
    }
}

impl LedgerConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub(crate) fn to_sled(&self) -> sled::Config {
        sled::Config::new()
            .path(&self.path)
            .temporary(self.temporary)
            .cache_capacity(self.cache_capacity)
    }
}
