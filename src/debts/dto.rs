use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debts::repo::{DebtStatus, StatusTotal};
use crate::error::ApiError;

pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateDebtRequest {
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDebtRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<DebtStatus>,
}

/// Aggregated view of a user's debts split by status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebtSummary {
    pub total_debts: i64,
    pub pending_debts: i64,
    pub paid_debts: i64,
    pub total_amount: Decimal,
    pub pending_amount: Decimal,
    pub paid_amount: Decimal,
}

impl DebtSummary {
    /// Folds the grouped aggregate rows; a status with no rows counts as zero.
    pub fn from_totals(totals: &[StatusTotal]) -> Self {
        let mut pending = (0i64, Decimal::ZERO);
        let mut paid = (0i64, Decimal::ZERO);
        for row in totals {
            match row.status {
                DebtStatus::Pending => pending = (row.count, row.total),
                DebtStatus::Paid => paid = (row.count, row.total),
            }
        }
        Self {
            total_debts: pending.0 + paid.0,
            pending_debts: pending.0,
            paid_debts: paid.0,
            total_amount: pending.1 + paid.1,
            pending_amount: pending.1,
            paid_amount: paid.1,
        }
    }
}

/// Amount must be strictly positive; stored at 2 decimal places. Rounding
/// happens first so a sub-cent input cannot sneak a 0.00 past the check and
/// into the store's `amount > 0` constraint.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ApiError> {
    let rounded = amount.round_dp(2);
    if rounded <= Decimal::ZERO {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }
    Ok(rounded)
}

pub fn validate_description(description: &str) -> Result<String, ApiError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation("Description cannot be empty".into()));
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::Validation(
            "Description cannot exceed 500 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::new(-100, 2)).is_err());
        // 0.01 is the smallest accepted amount
        assert_eq!(
            validate_amount(Decimal::new(1, 2)).unwrap(),
            Decimal::new(1, 2)
        );
    }

    #[test]
    fn amount_is_rounded_to_two_places() {
        let rounded = validate_amount("10.005".parse().unwrap()).unwrap();
        assert_eq!(rounded, "10.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn sub_cent_amount_is_rejected_not_rounded_to_zero() {
        // 0.004 is > 0 but rounds to 0.00, which must fail validation
        // rather than reach the store.
        let err = validate_amount("0.004".parse().unwrap()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Amount must be positive");
    }

    #[test]
    fn description_rules() {
        assert!(validate_description("").is_err());
        assert!(validate_description("   ").is_err());
        assert_eq!(validate_description("  rent  ").unwrap(), "rent");
        assert!(validate_description(&"x".repeat(500)).is_ok());
        assert!(validate_description(&"x".repeat(501)).is_err());
    }

    #[test]
    fn summary_arithmetic() {
        // 2 pending debts of 10.00 and 20.00, 1 paid debt of 5.00
        let totals = vec![
            StatusTotal {
                status: DebtStatus::Pending,
                count: 2,
                total: "30.00".parse().unwrap(),
            },
            StatusTotal {
                status: DebtStatus::Paid,
                count: 1,
                total: "5.00".parse().unwrap(),
            },
        ];
        let summary = DebtSummary::from_totals(&totals);
        assert_eq!(summary.total_debts, 3);
        assert_eq!(summary.pending_debts, 2);
        assert_eq!(summary.paid_debts, 1);
        assert_eq!(summary.total_amount, "35.00".parse().unwrap());
        assert_eq!(summary.pending_amount, "30.00".parse().unwrap());
        assert_eq!(summary.paid_amount, "5.00".parse().unwrap());
    }

    #[test]
    fn summary_with_no_rows_is_all_zero() {
        let summary = DebtSummary::from_totals(&[]);
        assert_eq!(summary.total_debts, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
    }
}
