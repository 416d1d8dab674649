//! Loan descriptions as supplied by the application form: the prospective
//! new loan and the applicant's existing loans.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoanDsrError;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Loan category. Decides which regulatory maturity override, if any, applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    /// Housing-collateralized mortgage.
    Mortgage,
    /// Studio/office (officetel) collateralized loan.
    StudioOffice,
    /// Unsecured credit loan.
    Credit,
    /// Loan collateralized by non-housing real estate.
    NonHousingCollateral,
    Other,
}

/// Contractual repayment style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Level monthly payment of principal and interest (annuity).
    EqualInstallment,
    /// Fixed monthly principal, declining interest.
    EqualPrincipal,
    /// Interest only, principal repaid in one lump sum at maturity.
    BulletAtMaturity,
    /// Blend of amortizing and bullet repayment. Treated as bullet.
    Mixed,
}

impl RepaymentMethod {
    /// True when the loan follows a real amortization schedule.
    pub fn is_amortizing(self) -> bool {
        matches!(
            self,
            RepaymentMethod::EqualInstallment | RepaymentMethod::EqualPrincipal
        )
    }
}

impl LoanType {
    pub const ALL: [LoanType; 5] = [
        LoanType::Mortgage,
        LoanType::StudioOffice,
        LoanType::Credit,
        LoanType::NonHousingCollateral,
        LoanType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanType::Mortgage => "mortgage",
            LoanType::StudioOffice => "studio_office",
            LoanType::Credit => "credit",
            LoanType::NonHousingCollateral => "non_housing_collateral",
            LoanType::Other => "other",
        }
    }
}

impl RepaymentMethod {
    pub const ALL: [RepaymentMethod; 4] = [
        RepaymentMethod::EqualInstallment,
        RepaymentMethod::EqualPrincipal,
        RepaymentMethod::BulletAtMaturity,
        RepaymentMethod::Mixed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepaymentMethod::EqualInstallment => "equal_installment",
            RepaymentMethod::EqualPrincipal => "equal_principal",
            RepaymentMethod::BulletAtMaturity => "bullet_at_maturity",
            RepaymentMethod::Mixed => "mixed",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts snake_case or kebab-case names, case-insensitively.
fn normalise_label(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for LoanType {
    type Err = LoanDsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = normalise_label(s);
        LoanType::ALL
            .into_iter()
            .find(|t| t.as_str() == label)
            .ok_or_else(|| LoanDsrError::InvalidInput {
                field: "loan_type".into(),
                reason: format!(
                    "Unknown loan type '{s}' (expected one of mortgage, studio_office, credit, non_housing_collateral, other)"
                ),
            })
    }
}

impl FromStr for RepaymentMethod {
    type Err = LoanDsrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = normalise_label(s);
        RepaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == label)
            .ok_or_else(|| LoanDsrError::InvalidInput {
                field: "repayment_method".into(),
                reason: format!(
                    "Unknown repayment method '{s}' (expected one of equal_installment, equal_principal, bullet_at_maturity, mixed)"
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// Loan inputs
// ---------------------------------------------------------------------------

/// Financial parameters of one loan, independent of whether it is new or
/// already outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_type: LoanType,
    /// Principal for a new loan, outstanding balance for an existing one.
    pub principal: Money,
    /// Nominal annual interest rate in percent.
    pub annual_rate: Percent,
    /// Declared (new) or remaining (existing) term in months.
    pub term_months: u32,
    pub repayment_method: RepaymentMethod,
}

impl LoanTerms {
    /// Loans without a positive principal take no part in the ratios.
    pub fn is_active(&self) -> bool {
        self.principal > Decimal::ZERO
    }
}

/// The prospective loan under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    pub loan_type: LoanType,
    pub amount: Money,
    pub term_months: u32,
    /// Nominal annual rate in percent, before the stress add-on.
    pub interest_rate: Percent,
    pub repayment_method: RepaymentMethod,
}

impl NewLoan {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            loan_type: self.loan_type,
            principal: self.amount,
            annual_rate: self.interest_rate,
            term_months: self.term_months,
            repayment_method: self.repayment_method,
        }
    }
}

/// A loan the applicant is already servicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingLoan {
    /// Caller-side identifier; carried through to the breakdown only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub loan_type: LoanType,
    pub balance: Money,
    pub interest_rate: Percent,
    pub remaining_months: u32,
    pub repayment_method: RepaymentMethod,
}

impl ExistingLoan {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            loan_type: self.loan_type,
            principal: self.balance,
            annual_rate: self.interest_rate,
            term_months: self.remaining_months,
            repayment_method: self.repayment_method,
        }
    }
}
