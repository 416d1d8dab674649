use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanDsrError;
use crate::types::{Money, Percent, Rate};
use crate::LoanDsrResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly periodic rate for an annual percentage rate (6.0 -> 0.005).
pub fn monthly_rate(annual_rate: Percent) -> Rate {
    annual_rate / dec!(100) / MONTHS_PER_YEAR
}

/// Simple annual interest on `principal` at `annual_rate` percent.
pub fn simple_annual_interest(principal: Money, annual_rate: Percent) -> Money {
    principal * annual_rate / dec!(100)
}

/// Level monthly payment that retires `principal` over `nper` months.
///
/// `M = P·r·(1+r)^n / ((1+r)^n − 1)`; with a zero rate the payment is the
/// straight-line `P / n`. When `(1+r)^n` exceeds the Decimal range the
/// payment is taken at its limit `P·r`.
pub fn level_payment(monthly_rate: Rate, nper: u32, principal: Money) -> LoanDsrResult<Money> {
    if nper == 0 {
        return Err(LoanDsrError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = match (Decimal::ONE + monthly_rate).checked_powi(i64::from(nper)) {
        Some(factor) => factor,
        // factor / (factor - 1) is 1 to full precision here
        None => return Ok(principal * monthly_rate),
    };
    let annuity_denominator = factor - Decimal::ONE;

    if annuity_denominator.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    // factor / (factor - 1) stays near 1, so divide before scaling by principal.
    Ok(principal * monthly_rate * (factor / annuity_denominator))
}
