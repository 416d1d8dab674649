//! Annual DSR repayment for a single loan, outside a full assessment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::loan::LoanTerms;
use super::rules::{dsr_basis, effective_rate, resolve_strategy, AmortizationStrategy, DsrBasis};
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Percent};
use crate::{LoanDsrError, LoanDsrResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRepaymentInput {
    pub loan: LoanTerms,
    /// Stress add-on in percent; set only when assessing a prospective loan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_rate: Option<Percent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRepaymentOutput {
    pub strategy: AmortizationStrategy,
    pub basis: DsrBasis,
    pub basis_description: String,
    pub effective_rate: Percent,
    pub annual_principal: Money,
    pub annual_interest: Money,
    pub annual_repayment: Money,
}

/// Resolve and compute the first-year repayment of one loan.
pub fn calculate_loan_repayment(
    input: &LoanRepaymentInput,
) -> LoanDsrResult<ComputationOutput<LoanRepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let loan = &input.loan;

    validate_input(input)?;

    let strategy = resolve_strategy(loan.loan_type, loan.repayment_method);
    let basis = dsr_basis(loan.loan_type, loan.repayment_method);
    let rate = effective_rate(loan.annual_rate, input.stress_rate);
    let repayment = strategy.first_year(loan.principal, rate, loan.term_months)?;

    if !strategy.uses_declared_term() {
        warnings.push(format!(
            "Declared term of {} months is not used under the {} basis",
            loan.term_months,
            basis.description()
        ));
    }

    let output = LoanRepaymentOutput {
        strategy,
        basis,
        basis_description: basis.description().to_string(),
        effective_rate: rate,
        annual_principal: round_currency(repayment.annual_principal),
        annual_interest: round_currency(repayment.annual_interest),
        annual_repayment: round_currency(repayment.total()),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "DSR first-year repayment (single loan)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_input(input: &LoanRepaymentInput) -> LoanDsrResult<()> {
    let loan = &input.loan;
    if !loan.is_active() {
        return Err(LoanDsrError::InvalidInput {
            field: "loan.principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if loan.annual_rate < Decimal::ZERO {
        return Err(LoanDsrError::InvalidInput {
            field: "loan.annual_rate".into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    if let Some(stress) = input.stress_rate {
        if stress < Decimal::ZERO {
            return Err(LoanDsrError::InvalidInput {
                field: "stress_rate".into(),
                reason: "Stress rate cannot be negative.".into(),
            });
        }
    }
    if loan.term_months == 0 {
        return Err(LoanDsrError::InvalidInput {
            field: "loan.term_months".into(),
            reason: "Term must be at least one month.".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsr::loan::{LoanType, RepaymentMethod};
    use rust_decimal_macros::dec;

    fn credit_bullet() -> LoanRepaymentInput {
        LoanRepaymentInput {
            loan: LoanTerms {
                loan_type: LoanType::Credit,
                principal: dec!(20_000_000),
                annual_rate: dec!(8.0),
                term_months: 36,
                repayment_method: RepaymentMethod::BulletAtMaturity,
            },
            stress_rate: None,
        }
    }

    #[test]
    fn test_credit_bullet_single_loan() {
        let out = calculate_loan_repayment(&credit_bullet()).unwrap();
        let r = &out.result;
        assert_eq!(r.annual_principal, dec!(4_000_000));
        assert_eq!(r.annual_interest, dec!(1_600_000));
        assert_eq!(r.annual_repayment, dec!(5_600_000));
        assert_eq!(r.basis, DsrBasis::FiveYearMaturity);
        assert_eq!(r.basis_description, "5-year maturity imputed");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_stress_raises_effective_rate() {
        let input = LoanRepaymentInput {
            stress_rate: Some(dec!(1.5)),
            ..credit_bullet()
        };
        let out = calculate_loan_repayment(&input).unwrap();
        assert_eq!(out.result.effective_rate, dec!(9.5));
        assert_eq!(out.result.annual_interest, dec!(1_900_000));
    }

    #[test]
    fn test_amortizing_loan_has_no_warning() {
        let mut input = credit_bullet();
        input.loan.repayment_method = RepaymentMethod::EqualPrincipal;
        let out = calculate_loan_repayment(&input).unwrap();
        assert_eq!(out.result.strategy, AmortizationStrategy::EqualPrincipal);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_zero_principal_rejected() {
        let mut input = credit_bullet();
        input.loan.principal = Decimal::ZERO;
        let err = calculate_loan_repayment(&input).unwrap_err();
        match err {
            LoanDsrError::InvalidInput { field, .. } => assert_eq!(field, "loan.principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
