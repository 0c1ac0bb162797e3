//! Service layer API for loan lifecycle operations
use super::codec;
use super::config::EngineConfig;
use super::error::LoanError;
use super::ledger::LedgerStore;
use super::loan::LoanRecord;
use super::validation;
use rust_decimal::Decimal;
use std::fmt;

/// The operation a storage or encoding failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ApplyForLoan,
    ApproveLoan,
    MakeRepayment,
    CheckLoanBalance,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ApplyForLoan => "ApplyForLoan",
            Operation::ApproveLoan => "ApproveLoan",
            Operation::MakeRepayment => "MakeRepayment",
            Operation::CheckLoanBalance => "CheckLoanBalance",
        };
        f.write_str(name)
    }
}

/// A decoded record together with the exact bytes it was read from.
struct Loaded {
    loan: LoanRecord,
    raw: Vec<u8>,
}

/// Runs each loan operation as one read-validate-write cycle against `L`.
///
/// Holds no state between calls beyond the ledger handle and config. Every
/// check happens before the single write, so a failed call leaves the ledger
/// as it was. The write is conditional on the key still holding the bytes
/// read at the start of the same call.
pub struct LoanService<L> {
    ledger: L,
    config: EngineConfig,
}

impl<L: LedgerStore> LoanService<L> {
    pub fn new(ledger: L) -> Self {
        Self::with_config(ledger, EngineConfig::default())
    }

    pub fn with_config(ledger: L, config: EngineConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Fetch and decode the record under `loan_id`, if any
    fn load_loan(&self, op: Operation, loan_id: &str) -> Result<Option<Loaded>, LoanError> {
        let bytes = self.ledger.get(loan_id).map_err(|source| {
            tracing::error!(%op, loan_id, error = %source, "ledger read failed");
            LoanError::Storage {
                operation: op,
                loan_id: loan_id.to_string(),
                source,
            }
        })?;

        let Some(raw) = bytes else {
            return Ok(None);
        };

        let loan = codec::decode(&raw).map_err(|source| {
            tracing::error!(%op, loan_id, error = %source, "stored loan record is unreadable");
            LoanError::Encoding {
                operation: op,
                loan_id: loan_id.to_string(),
                source,
            }
        })?;
        Ok(Some(Loaded { loan, raw }))
    }

    /// Like [`Self::load_loan`] but a missing record is an error
    fn require_loan(&self, op: Operation, loan_id: &str) -> Result<Loaded, LoanError> {
        match self.load_loan(op, loan_id)? {
            Some(loaded) => Ok(loaded),
            None => Err(rejected(op, LoanError::NotFound(loan_id.to_string()))),
        }
    }

    /// Encode and write the record back under its id, provided the key still
    /// holds `observed`
    fn save_loan(
        &self,
        op: Operation,
        loan: &LoanRecord,
        observed: Option<&[u8]>,
    ) -> Result<(), LoanError> {
        let bytes = codec::encode(loan).map_err(|source| {
            tracing::error!(%op, loan_id = %loan.loan_id, error = %source, "failed to encode loan record");
            LoanError::Encoding {
                operation: op,
                loan_id: loan.loan_id.clone(),
                source,
            }
        })?;

        self.ledger
            .put_if_unchanged(&loan.loan_id, observed, bytes)
            .map_err(|source| {
                tracing::error!(%op, loan_id = %loan.loan_id, error = %source, "ledger write failed");
                LoanError::Storage {
                    operation: op,
                    loan_id: loan.loan_id.clone(),
                    source,
                }
            })
    }

    /// Record a new loan application in the `Pending` state
    pub fn apply_for_loan(
        &self,
        loan_id: &str,
        applicant_name: &str,
        loan_amount: Decimal,
        term_months: i64,
        interest_rate: Decimal,
    ) -> Result<(), LoanError> {
        let op = Operation::ApplyForLoan;

        // An id is never reused, whatever state the existing loan is in
        if self.load_loan(op, loan_id)?.is_some() {
            return Err(rejected(op, LoanError::AlreadyExists(loan_id.to_string())));
        }

        validation::validate_application(
            loan_id,
            applicant_name,
            loan_amount,
            term_months,
            interest_rate,
        )
        .map_err(|e| rejected(op, e))?;

        let loan = LoanRecord::originate(
            loan_id.to_string(),
            applicant_name.to_string(),
            loan_amount,
            term_months,
            interest_rate,
            self.config.outstanding_baseline,
        )
        .map_err(|e| rejected(op, e))?;

        self.save_loan(op, &loan, None)?;

        tracing::info!(
            loan_id,
            %loan_amount,
            term_months,
            outstanding = %loan.outstanding,
            "loan application recorded"
        );
        Ok(())
    }

    /// Move a pending loan to `status`. The string is stored verbatim.
    pub fn approve_loan(&self, loan_id: &str, status: &str) -> Result<(), LoanError> {
        let op = Operation::ApproveLoan;

        // Load from the ledger
        let Loaded { mut loan, raw } = self.require_loan(op, loan_id)?;

        // Verify it is still awaiting a decision
        validation::check_approvable(&loan).map_err(|e| rejected(op, e))?;
        validation::check_approval_status(status, &self.config).map_err(|e| rejected(op, e))?;

        loan.set_status(status.to_string());

        // Save back to the ledger
        self.save_loan(op, &loan, Some(&raw))?;

        tracing::info!(loan_id, status, "loan status decided");
        Ok(())
    }

    /// Apply a repayment to a decided loan
    pub fn make_repayment(&self, loan_id: &str, repayment_amount: Decimal) -> Result<(), LoanError> {
        let op = Operation::MakeRepayment;

        let Loaded { mut loan, raw } = self.require_loan(op, loan_id)?;

        validation::check_repayable(&loan, &self.config).map_err(|e| rejected(op, e))?;

        loan.record_repayment(repayment_amount)
            .map_err(|e| rejected(op, e))?;

        self.save_loan(op, &loan, Some(&raw))?;

        tracing::info!(
            loan_id,
            amount = %repayment_amount,
            outstanding = %loan.outstanding,
            repayments = loan.repayments.len(),
            "repayment recorded"
        );
        Ok(())
    }

    /// Read the full record. Never writes.
    pub fn check_loan_balance(&self, loan_id: &str) -> Result<LoanRecord, LoanError> {
        let op = Operation::CheckLoanBalance;

        let Loaded { loan, .. } = self.require_loan(op, loan_id)?;

        tracing::debug!(loan_id, outstanding = %loan.outstanding, status = %loan.status, "loan balance read");
        Ok(loan)
    }
}

fn rejected(op: Operation, err: LoanError) -> LoanError {
    tracing::warn!(%op, error = %err, "loan operation rejected");
    err
}
