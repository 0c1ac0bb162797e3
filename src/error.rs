use super::ledger::LedgerError;
use super::service::Operation;

#[derive(thiserror::Error, Debug)]
pub enum LoanError {
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
    #[error("loan {0} already exists")]
    AlreadyExists(String),
    #[error("loan {0} not found")]
    NotFound(String),
    #[error("loan {loan_id} is {status:?}: {reason}")]
    InvalidTransition {
        loan_id: String,
        status: String,
        reason: &'static str,
    },
    #[error("{operation} on loan {loan_id} failed at the ledger: {source}")]
    Storage {
        operation: Operation,
        loan_id: String,
        #[source]
        source: LedgerError,
    },
    #[error("{operation} on loan {loan_id} failed to encode or decode the record: {source}")]
    Encoding {
        operation: Operation,
        loan_id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoanError {
    pub(crate) fn invalid_input(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidInput { field, reason }
    }

    /// True for failures that originate in the ledger or codec rather than in
    /// the caller's request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Encoding { .. })
    }
}
