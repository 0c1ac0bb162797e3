//! Loan lifecycle engine over an injected key-value ledger.
//!
//! [`service::LoanService`] runs the four operations (apply, approve, repay,
//! check balance) as single read-validate-write cycles against any
//! [`ledger::LedgerStore`]. Records are stored as named-field JSON.

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod service;
pub mod sled_ledger;
pub mod utils;
pub mod validation;

pub use config::{EngineConfig, LedgerConfig};
pub use error::LoanError;
pub use ledger::{LedgerError, LedgerStore, MemoryLedger};
pub use loan::LoanRecord;
pub use service::{LoanService, Operation};
pub use sled_ledger::SledLedger;
