//! The persisted loan record
use super::error::LoanError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

pub const PENDING: &str = "Pending";
pub const APPROVED: &str = "Approved";
pub const REJECTED: &str = "Rejected";

// Field names and order are the ledger format, other readers depend on them.
// Amounts are written as exact JSON numbers, never rounded through f64.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    #[serde(rename = "loanID")]
    pub loan_id: String, // ledger key
    #[serde(rename = "applicantName")]
    pub applicant_name: String,
    #[serde(rename = "loanAmount")]
    pub loan_amount: Decimal,
    #[serde(rename = "termMonths")]
    pub term_months: i64,
    #[serde(rename = "interestRate")]
    pub interest_rate: Decimal,
    pub outstanding: Decimal, // may go negative, repayments are not floored
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub repayments: Vec<Decimal>, // append-only
}

impl LoanRecord {
    /// Construct a freshly originated record in the `Pending` state.
    ///
    /// Fails if `baseline - loan_amount` does not fit in a `Decimal`.
    pub fn originate(
        loan_id: String,
        applicant_name: String,
        loan_amount: Decimal,
        term_months: i64,
        interest_rate: Decimal,
        baseline: Decimal,
    ) -> Result<Self, LoanError> {
        let outstanding = baseline.checked_sub(loan_amount).ok_or_else(|| {
            LoanError::invalid_input("loan_amount", "outstanding balance out of range")
        })?;

        Ok(Self {
            loan_id,
            applicant_name,
            loan_amount,
            term_months,
            interest_rate,
            outstanding,
            status: PENDING.to_string(),
            repayments: vec![],
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == PENDING
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    /// Leaves the record untouched when the new balance would overflow.
    pub fn record_repayment(&mut self, amount: Decimal) -> Result<(), LoanError> {
        self.outstanding = self.outstanding.checked_sub(amount).ok_or_else(|| {
            LoanError::invalid_input("repayment_amount", "outstanding balance out of range")
        })?;
        self.repayments.push(amount);
        Ok(())
    }

    /// Sum of every repayment recorded so far, `None` if it overflows.
    pub fn total_repaid(&self) -> Option<Decimal> {
        self.repayments
            .iter()
            .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(*amount))
    }
}

// older writers emit `null` for a loan without repayments
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Decimal>>::deserialize(deserializer)?.unwrap_or_default())
}
