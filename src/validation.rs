//! Pure checks on operation inputs and on the transitions a record may take
use super::config::EngineConfig;
use super::error::LoanError;
use super::loan::{LoanRecord, PENDING, REJECTED};
use rust_decimal::Decimal;

/// Field checks for a loan application, in the order they are reported.
/// Existence on the ledger is checked by the caller before this runs.
pub fn validate_application(
    loan_id: &str,
    applicant_name: &str,
    loan_amount: Decimal,
    term_months: i64,
    interest_rate: Decimal,
) -> Result<(), LoanError> {
    if loan_id.is_empty() {
        return Err(LoanError::invalid_input("loan_id", "cannot be empty"));
    }
    if applicant_name.is_empty() {
        return Err(LoanError::invalid_input("applicant_name", "cannot be empty"));
    }
    if loan_amount <= Decimal::ZERO {
        return Err(LoanError::invalid_input("loan_amount", "must be greater than zero"));
    }
    if term_months <= 0 {
        return Err(LoanError::invalid_input("term_months", "must be greater than zero"));
    }
    if interest_rate <= Decimal::ZERO {
        return Err(LoanError::invalid_input("interest_rate", "must be greater than zero"));
    }
    Ok(())
}

/// Only pending loans can be approved, and approval is one-shot.
pub fn check_approvable(loan: &LoanRecord) -> Result<(), LoanError> {
    if !loan.is_pending() {
        return Err(LoanError::InvalidTransition {
            loan_id: loan.loan_id.clone(),
            status: loan.status.clone(),
            reason: "cannot approve non-pending loans",
        });
    }
    Ok(())
}

/// With no configured set every status string is accepted verbatim.
pub fn check_approval_status(status: &str, config: &EngineConfig) -> Result<(), LoanError> {
    match &config.approval_statuses {
        Some(allowed) if !allowed.iter().any(|s| s == status) => Err(LoanError::invalid_input(
            "status",
            "not one of the configured approval statuses",
        )),
        _ => Ok(()),
    }
}

/// Whether a loan in `status` may take a repayment.
///
/// Anything but `Pending` is repayable, `Rejected` included, unless the
/// config blocks rejected loans.
pub fn repayment_permitted(status: &str, config: &EngineConfig) -> bool {
    if status == PENDING {
        return false;
    }
    !(config.block_rejected_repayments && status == REJECTED)
}

pub fn check_repayable(loan: &LoanRecord, config: &EngineConfig) -> Result<(), LoanError> {
    if repayment_permitted(&loan.status, config) {
        return Ok(());
    }
    let reason = if loan.is_pending() {
        "cannot repay a pending loan"
    } else {
        "cannot repay a rejected loan"
    };
    Err(LoanError::InvalidTransition {
        loan_id: loan.loan_id.clone(),
        status: loan.status.clone(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::APPROVED;
    use rust_decimal_macros::dec;

    fn field_of(result: Result<(), LoanError>) -> &'static str {
        match result {
            Err(LoanError::InvalidInput { field, .. }) => field,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn first_failing_field_wins() {
        let zero = Decimal::ZERO;

        assert_eq!(field_of(validate_application("", "", zero, 0, zero)), "loan_id");
        assert_eq!(field_of(validate_application("L1", "", zero, 0, zero)), "applicant_name");
        assert_eq!(field_of(validate_application("L1", "A", zero, 0, zero)), "loan_amount");
        assert_eq!(field_of(validate_application("L1", "A", dec!(1), 0, zero)), "term_months");
        assert_eq!(field_of(validate_application("L1", "A", dec!(1), 1, zero)), "interest_rate");
        assert!(validate_application("L1", "A", dec!(1), 1, dec!(0.01)).is_ok());
    }

    #[test]
    fn negative_values_are_rejected() {
        assert_eq!(
            field_of(validate_application("L1", "A", dec!(-5), 12, dec!(1))),
            "loan_amount"
        );
        assert_eq!(
            field_of(validate_application("L1", "A", dec!(5), -12, dec!(1))),
            "term_months"
        );
        assert_eq!(
            field_of(validate_application("L1", "A", dec!(5), 12, dec!(-1))),
            "interest_rate"
        );
    }

    #[test]
    fn repayment_rule_by_status() {
        let open = EngineConfig::default();
        let strict = EngineConfig {
            block_rejected_repayments: true,
            ..EngineConfig::default()
        };

        assert!(!repayment_permitted(PENDING, &open));
        assert!(repayment_permitted(APPROVED, &open));
        assert!(repayment_permitted(REJECTED, &open));
        assert!(repayment_permitted("OnHold", &open));

        assert!(!repayment_permitted(REJECTED, &strict));
        assert!(repayment_permitted(APPROVED, &strict));
    }

    #[test]
    fn approval_status_set_is_optional() {
        let open = EngineConfig::default();
        let closed = EngineConfig {
            approval_statuses: Some(vec![APPROVED.into(), REJECTED.into()]),
            ..EngineConfig::default()
        };

        assert!(check_approval_status("Whatever", &open).is_ok());
        assert!(check_approval_status(APPROVED, &closed).is_ok());
        assert!(check_approval_status("Whatever", &closed).is_err());
    }
}
