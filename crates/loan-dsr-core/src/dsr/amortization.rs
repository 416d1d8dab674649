//! First-year repayment under real amortization schedules.
//!
//! Both calculators simulate the schedule month by month for the first
//! twelve months (or the whole term when shorter), so the shrinking interest
//! share of an annuity is captured exactly rather than approximated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanDsrError;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{Money, Percent};
use crate::LoanDsrResult;

/// Months counted towards the annual repayment.
pub const FIRST_YEAR_MONTHS: u32 = 12;

/// Principal and interest attributable to the first year of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualRepayment {
    pub annual_principal: Money,
    pub annual_interest: Money,
}

impl AnnualRepayment {
    pub const ZERO: AnnualRepayment = AnnualRepayment {
        annual_principal: Decimal::ZERO,
        annual_interest: Decimal::ZERO,
    };

    /// Total debt service for the year.
    pub fn total(&self) -> Money {
        self.annual_principal + self.annual_interest
    }
}

impl std::ops::Add for AnnualRepayment {
    type Output = AnnualRepayment;

    fn add(self, rhs: AnnualRepayment) -> AnnualRepayment {
        AnnualRepayment {
            annual_principal: self.annual_principal + rhs.annual_principal,
            annual_interest: self.annual_interest + rhs.annual_interest,
        }
    }
}

impl std::ops::AddAssign for AnnualRepayment {
    fn add_assign(&mut self, rhs: AnnualRepayment) {
        *self = *self + rhs;
    }
}

/// Equal-installment (annuity) repayment over the first year.
pub fn equal_installment_first_year(
    principal: Money,
    annual_rate: Percent,
    total_months: u32,
) -> LoanDsrResult<AnnualRepayment> {
    validate_term(total_months)?;

    let r = monthly_rate(annual_rate);
    let payment = level_payment(r, total_months, principal)?;

    let mut balance = principal;
    let mut repayment = AnnualRepayment::ZERO;

    for _ in 0..simulated_months(total_months) {
        let interest = balance * r;
        let principal_part = payment - interest;
        repayment.annual_interest += interest;
        repayment.annual_principal += principal_part;
        balance -= principal_part;
    }

    Ok(repayment)
}

/// Equal-principal repayment over the first year.
pub fn equal_principal_first_year(
    principal: Money,
    annual_rate: Percent,
    total_months: u32,
) -> LoanDsrResult<AnnualRepayment> {
    validate_term(total_months)?;

    let r = monthly_rate(annual_rate);
    let monthly_principal = principal / Decimal::from(total_months);

    let mut balance = principal;
    let mut repayment = AnnualRepayment::ZERO;

    for _ in 0..simulated_months(total_months) {
        repayment.annual_interest += balance * r;
        repayment.annual_principal += monthly_principal;
        balance -= monthly_principal;
    }

    Ok(repayment)
}

fn simulated_months(total_months: u32) -> u32 {
    total_months.min(FIRST_YEAR_MONTHS)
}

fn validate_term(total_months: u32) -> LoanDsrResult<()> {
    if total_months == 0 {
        return Err(LoanDsrError::InvalidInput {
            field: "term_months".into(),
            reason: "An amortizing loan needs a term of at least one month.".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_annuity_first_year_thirty_year_mortgage() {
        let out = equal_installment_first_year(dec!(100_000_000), dec!(6.0), 360).unwrap();
        assert_close(out.annual_principal, dec!(1_228_011.71), dec!(0.01), "principal");
        assert_close(out.annual_interest, dec!(5_966_594.59), dec!(0.01), "interest");
        // Twelve level payments of ~599,550.53
        assert_close(out.total(), dec!(7_194_606.30), dec!(0.01), "total");
    }

    #[test]
    fn test_annuity_interest_share_shrinks() {
        let early = equal_installment_first_year(dec!(10_000_000), dec!(5.0), 24).unwrap();
        // Interest is charged on a declining balance, so the first year
        // carries less than a full year of interest on the original principal.
        assert!(early.annual_interest < dec!(500_000));
        assert!(early.annual_principal > dec!(4_500_000));
    }

    #[test]
    fn test_annuity_short_term_repays_whole_principal() {
        let out = equal_installment_first_year(dec!(6_000_000), dec!(4.0), 6).unwrap();
        assert_close(out.annual_principal, dec!(6_000_000), dec!(0.0001), "principal");
        assert!(out.annual_interest > Decimal::ZERO);
    }

    #[test]
    fn test_annuity_zero_rate_is_straight_line() {
        let out = equal_installment_first_year(dec!(36_000_000), Decimal::ZERO, 36).unwrap();
        assert_eq!(out.annual_principal, dec!(12_000_000));
        assert_eq!(out.annual_interest, Decimal::ZERO);
    }

    #[test]
    fn test_annuity_zero_rate_short_term() {
        // Only the months that exist are counted: principal * min(12, n) / n
        let out = equal_installment_first_year(dec!(9_000_000), Decimal::ZERO, 9).unwrap();
        assert_eq!(out.annual_principal, dec!(9_000_000));
        assert_eq!(out.annual_interest, Decimal::ZERO);
    }

    #[test]
    fn test_equal_principal_first_year() {
        // Balance declines 500k a month; interest = 111M * 0.05 / 12
        let out = equal_principal_first_year(dec!(12_000_000), dec!(5.0), 24).unwrap();
        assert_eq!(out.annual_principal, dec!(6_000_000));
        assert_close(out.annual_interest, dec!(462_500), dec!(0.000001), "interest");
    }

    #[test]
    fn test_equal_principal_zero_rate() {
        let out = equal_principal_first_year(dec!(24_000_000), Decimal::ZERO, 48).unwrap();
        assert_eq!(out.annual_principal, dec!(6_000_000));
        assert_eq!(out.annual_interest, Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_rejected() {
        let err = equal_principal_first_year(dec!(1_000_000), dec!(3.0), 0).unwrap_err();
        match err {
            LoanDsrError::InvalidInput { field, .. } => assert_eq!(field, "term_months"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert!(equal_installment_first_year(dec!(1_000_000), dec!(3.0), 0).is_err());
    }

    #[test]
    fn test_annual_repayment_addition() {
        let a = AnnualRepayment {
            annual_principal: dec!(100),
            annual_interest: dec!(20),
        };
        let mut b = AnnualRepayment {
            annual_principal: dec!(50),
            annual_interest: dec!(5),
        };
        b += a;
        assert_eq!(b.total(), dec!(175));
        assert_eq!((a + AnnualRepayment::ZERO), a);
    }
}
