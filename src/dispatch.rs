//! Maps a host's function name and string arguments onto [`LoanService`] calls
use super::codec;
use super::ledger::LedgerStore;
use super::service::LoanService;
use anyhow::{Context, bail};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    ApplyForLoan {
        loan_id: String,
        applicant_name: String,
        loan_amount: Decimal,
        term_months: i64,
        interest_rate: Decimal,
    },
    ApproveLoan {
        loan_id: String,
        status: String,
    },
    MakeRepayment {
        loan_id: String,
        repayment_amount: Decimal,
    },
    CheckLoanBalance {
        loan_id: String,
    },
}

impl Invocation {
    /// Parse a call such as `("MakeRepayment", ["L1", "2000"])`.
    pub fn parse(function: &str, args: &[&str]) -> anyhow::Result<Self> {
        let invocation = match (function, args) {
            ("ApplyForLoan", [loan_id, applicant_name, amount, term, rate]) => Self::ApplyForLoan {
                loan_id: loan_id.to_string(),
                applicant_name: applicant_name.to_string(),
                loan_amount: parse_decimal("loanAmount", amount)?,
                term_months: term
                    .parse()
                    .with_context(|| format!("termMonths is not an integer: {term:?}"))?,
                interest_rate: parse_decimal("interestRate", rate)?,
            },
            ("ApproveLoan", [loan_id, status]) => Self::ApproveLoan {
                loan_id: loan_id.to_string(),
                status: status.to_string(),
            },
            ("MakeRepayment", [loan_id, amount]) => Self::MakeRepayment {
                loan_id: loan_id.to_string(),
                repayment_amount: parse_decimal("repaymentAmount", amount)?,
            },
            ("CheckLoanBalance", [loan_id]) => Self::CheckLoanBalance {
                loan_id: loan_id.to_string(),
            },
            ("ApplyForLoan" | "ApproveLoan" | "MakeRepayment" | "CheckLoanBalance", _) => {
                bail!("{function} called with {} arguments", args.len())
            }
            _ => bail!("unknown function {function:?}"),
        };
        Ok(invocation)
    }

    /// Run against `service`. Only `CheckLoanBalance` produces a payload, the
    /// loan record in its ledger encoding.
    pub fn execute<L: LedgerStore>(
        &self,
        service: &LoanService<L>,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        match self {
            Self::ApplyForLoan {
                loan_id,
                applicant_name,
                loan_amount,
                term_months,
                interest_rate,
            } => {
                service.apply_for_loan(
                    loan_id,
                    applicant_name,
                    *loan_amount,
                    *term_months,
                    *interest_rate,
                )?;
                Ok(None)
            }
            Self::ApproveLoan { loan_id, status } => {
                service.approve_loan(loan_id, status)?;
                Ok(None)
            }
            Self::MakeRepayment {
                loan_id,
                repayment_amount,
            } => {
                service.make_repayment(loan_id, *repayment_amount)?;
                Ok(None)
            }
            Self::CheckLoanBalance { loan_id } => {
                let loan = service.check_loan_balance(loan_id)?;
                Ok(Some(codec::encode(&loan)?))
            }
        }
    }
}

/// Parse and run in one step.
pub fn invoke<L: LedgerStore>(
    service: &LoanService<L>,
    function: &str,
    args: &[&str],
) -> anyhow::Result<Option<Vec<u8>>> {
    let invocation = Invocation::parse(function, args)?;
    invocation
        .execute(service)
        .with_context(|| format!("{function} failed"))
}

fn parse_decimal(name: &str, raw: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("{name} is not a number: {raw:?}"))
}
