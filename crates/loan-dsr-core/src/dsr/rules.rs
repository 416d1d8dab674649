//! Regulatory repayment rules for DSR.
//!
//! Loan type takes precedence over repayment method: higher-risk asset
//! classes get an imputed maturity unless the borrower already amortizes on
//! a real schedule.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amortization::{
    equal_installment_first_year, equal_principal_first_year, AnnualRepayment,
};
use super::loan::{LoanTerms, LoanType, RepaymentMethod};
use crate::time_value::simple_annual_interest;
use crate::types::{Money, Percent};
use crate::LoanDsrResult;

/// Imputed maturity for non-housing collateral and non-amortizing studio/office loans.
pub const COLLATERAL_IMPUTED_YEARS: u32 = 8;

/// Imputed maturity for non-amortizing unsecured credit loans.
pub const CREDIT_IMPUTED_YEARS: u32 = 5;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// How a loan's first-year repayment is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationStrategy {
    /// Level-payment schedule over the declared term.
    Annuity,
    /// Fixed principal per month over the declared term.
    EqualPrincipal,
    /// Principal spread over a regulator-imputed number of years, plus a
    /// full year of interest on the whole principal.
    ImputedMaturity { years: u32 },
    /// No principal counted, a full year of interest.
    InterestOnly,
}

/// Pick the repayment strategy for a loan type / repayment method pair.
pub fn resolve_strategy(
    loan_type: LoanType,
    repayment_method: RepaymentMethod,
) -> AmortizationStrategy {
    use AmortizationStrategy::*;

    match (loan_type, repayment_method) {
        (LoanType::NonHousingCollateral, _) => ImputedMaturity {
            years: COLLATERAL_IMPUTED_YEARS,
        },
        (LoanType::StudioOffice, method) if !method.is_amortizing() => ImputedMaturity {
            years: COLLATERAL_IMPUTED_YEARS,
        },
        (LoanType::Credit, method) if !method.is_amortizing() => ImputedMaturity {
            years: CREDIT_IMPUTED_YEARS,
        },
        (_, RepaymentMethod::EqualInstallment) => Annuity,
        (_, RepaymentMethod::EqualPrincipal) => EqualPrincipal,
        // Mixed repayment has no blended schedule; it is counted as bullet.
        (_, RepaymentMethod::BulletAtMaturity | RepaymentMethod::Mixed) => InterestOnly,
    }
}

impl AmortizationStrategy {
    /// First-year principal and interest for `principal` at `annual_rate` percent.
    ///
    /// `term_months` is only read by the amortizing strategies.
    pub fn first_year(
        self,
        principal: Money,
        annual_rate: Percent,
        term_months: u32,
    ) -> LoanDsrResult<AnnualRepayment> {
        match self {
            AmortizationStrategy::Annuity => {
                equal_installment_first_year(principal, annual_rate, term_months)
            }
            AmortizationStrategy::EqualPrincipal => {
                equal_principal_first_year(principal, annual_rate, term_months)
            }
            AmortizationStrategy::ImputedMaturity { years } => Ok(AnnualRepayment {
                annual_principal: principal / Decimal::from(years),
                annual_interest: simple_annual_interest(principal, annual_rate),
            }),
            AmortizationStrategy::InterestOnly => Ok(AnnualRepayment {
                annual_principal: Decimal::ZERO,
                annual_interest: simple_annual_interest(principal, annual_rate),
            }),
        }
    }

    /// True when the declared term drives the result.
    pub fn uses_declared_term(self) -> bool {
        matches!(
            self,
            AmortizationStrategy::Annuity | AmortizationStrategy::EqualPrincipal
        )
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Rate actually used for the repayment: nominal plus the stress add-on when
/// one applies.
pub fn effective_rate(nominal_rate: Percent, stress_rate: Option<Percent>) -> Percent {
    match stress_rate {
        Some(stress) => nominal_rate + stress,
        None => nominal_rate,
    }
}

/// Annual repayment counted towards DSR for one loan.
///
/// `stress_rate` is `Some` only for the prospective new loan.
pub fn dsr_repayment(
    terms: &LoanTerms,
    stress_rate: Option<Percent>,
) -> LoanDsrResult<AnnualRepayment> {
    let rate = effective_rate(terms.annual_rate, stress_rate);
    resolve_strategy(terms.loan_type, terms.repayment_method).first_year(
        terms.principal,
        rate,
        terms.term_months,
    )
}

// ---------------------------------------------------------------------------
// Basis descriptor
// ---------------------------------------------------------------------------

/// Which principal basis a loan is assessed on, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DsrBasis {
    /// Studio/office or credit loan that amortizes on its real schedule.
    ActualAmortization,
    /// Loan assessed on its contractual terms (mortgage and other loans).
    ActualTerms,
    EightYearMaturity,
    FiveYearMaturity,
}

impl DsrBasis {
    pub fn description(self) -> &'static str {
        match self {
            DsrBasis::ActualAmortization => "Actual amortization schedule",
            DsrBasis::ActualTerms => "Actual repayment terms",
            DsrBasis::EightYearMaturity => "8-year maturity imputed",
            DsrBasis::FiveYearMaturity => "5-year maturity imputed",
        }
    }

    pub fn imputed_years(self) -> Option<u32> {
        match self {
            DsrBasis::EightYearMaturity => Some(COLLATERAL_IMPUTED_YEARS),
            DsrBasis::FiveYearMaturity => Some(CREDIT_IMPUTED_YEARS),
            DsrBasis::ActualAmortization | DsrBasis::ActualTerms => None,
        }
    }
}

pub fn dsr_basis(loan_type: LoanType, repayment_method: RepaymentMethod) -> DsrBasis {
    match loan_type {
        LoanType::StudioOffice | LoanType::Credit if repayment_method.is_amortizing() => {
            DsrBasis::ActualAmortization
        }
        LoanType::StudioOffice | LoanType::NonHousingCollateral => DsrBasis::EightYearMaturity,
        LoanType::Credit => DsrBasis::FiveYearMaturity,
        LoanType::Mortgage | LoanType::Other => DsrBasis::ActualTerms,
    }
}

/// Human-readable label for the rule that applies to a loan type / method pair.
pub fn get_basis_description(
    loan_type: LoanType,
    repayment_method: RepaymentMethod,
) -> &'static str {
    dsr_basis(loan_type, repayment_method).description()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
