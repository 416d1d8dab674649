use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::amortization::AnnualRepayment;
use super::loan::{ExistingLoan, LoanTerms, LoanType, NewLoan, RepaymentMethod};
use super::rules::{dsr_basis, effective_rate, resolve_strategy, AmortizationStrategy, DsrBasis};
use crate::types::{round_currency, round_percent, with_metadata, ComputationOutput, Money, Percent};
use crate::{LoanDsrError, LoanDsrResult};

/// DSR above this is over the regulatory limit.
pub const DSR_LIMIT: Percent = dec!(40);

/// DSR above this (and up to the limit) is close to the limit.
pub const DSR_WARNING_THRESHOLD: Percent = dec!(35);

/// Stress add-on used when the caller does not supply one.
pub const DEFAULT_STRESS_RATE: Percent = dec!(1.5);

/// Highest stress add-on offered by the market settings.
pub const MAX_STRESS_RATE: Percent = dec!(5);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Market-wide assumptions applied to the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Add-on rate in percent, applied to the new loan only.
    pub stress_rate: Percent,
}

impl Default for MarketContext {
    fn default() -> Self {
        MarketContext {
            stress_rate: DEFAULT_STRESS_RATE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsrDtiInput {
    pub annual_income: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_loan: Option<NewLoan>,
    #[serde(default)]
    pub existing_loans: Vec<ExistingLoan>,
    #[serde(default)]
    pub market: MarketContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Safe,
    Warning,
    Danger,
}

impl RiskStatus {
    /// Three-tier classification of a ratio in percent.
    pub fn classify(ratio: Percent) -> RiskStatus {
        if ratio > DSR_LIMIT {
            RiskStatus::Danger
        } else if ratio > DSR_WARNING_THRESHOLD {
            RiskStatus::Warning
        } else {
            RiskStatus::Safe
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskStatus::Safe => "DSR within 40% - loan can proceed",
            RiskStatus::Warning => "Caution - DSR approaching the limit",
            RiskStatus::Danger => "Limit exceeded - DSR above 40%",
        }
    }
}

/// Where a counted loan came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoanSource {
    New,
    Existing {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

/// One counted loan's share of the annual debt service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRepaymentDetail {
    pub source: LoanSource,
    pub loan_type: LoanType,
    pub repayment_method: RepaymentMethod,
    pub basis: DsrBasis,
    pub strategy: AmortizationStrategy,
    /// Rate used for the repayment, stress add-on included.
    pub effective_rate: Percent,
    pub annual_principal: Money,
    pub annual_interest: Money,
    pub annual_repayment: Money,
}

/// Split of total annual repayment between the new and existing loans, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentContribution {
    pub new_loan_share: Percent,
    pub existing_loans_share: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsrDtiOutput {
    pub dsr: Percent,
    pub dti: Percent,
    pub total_annual_repayment: Money,
    pub total_annual_interest: Money,
    pub total_annual_principal: Money,
    pub new_loan_annual_repayment: Money,
    pub existing_loans_annual_repayment: Money,
    pub status: RiskStatus,
    pub message: String,
    /// DTI measured against the same thresholds as DSR.
    pub dti_status: RiskStatus,
    pub contribution: RepaymentContribution,
    pub loan_breakdown: Vec<LoanRepaymentDetail>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute DSR and DTI for an applicant and wrap the result in the standard
/// output envelope.
pub fn calculate_dsr_dti(input: &DsrDtiInput) -> LoanDsrResult<ComputationOutput<DsrDtiOutput>> {
    let start = Instant::now();

    let (output, warnings) = assess(
        input.annual_income,
        input.new_loan.as_ref(),
        &input.existing_loans,
        input.market.stress_rate,
    )?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "stress_rate": input.market.stress_rate.to_string(),
        "stress_rate_scope": "new loan only",
        "dsr_limit": DSR_LIMIT.to_string(),
        "warning_threshold": DSR_WARNING_THRESHOLD.to_string(),
        "dti": "total annual interest plus new loan annual repayment",
        "mixed_repayment": "treated as bullet at maturity",
    });

    Ok(with_metadata(
        "DSR/DTI with regulatory imputed maturities (first-year repayment)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Pure DSR/DTI computation over a full input snapshot.
pub fn compute_dsr_dti(
    annual_income: Money,
    new_loan: Option<&NewLoan>,
    existing_loans: &[ExistingLoan],
    stress_rate: Percent,
) -> LoanDsrResult<DsrDtiOutput> {
    assess(annual_income, new_loan, existing_loans, stress_rate).map(|(output, _)| output)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn assess(
    annual_income: Money,
    new_loan: Option<&NewLoan>,
    existing_loans: &[ExistingLoan],
    stress_rate: Percent,
) -> LoanDsrResult<(DsrDtiOutput, Vec<String>)> {
    let mut warnings: Vec<String> = Vec::new();
    validate_input(annual_income, new_loan, existing_loans, stress_rate)?;

    if stress_rate > MAX_STRESS_RATE {
        warnings.push(format!(
            "Stress rate {stress_rate}% exceeds the usual {MAX_STRESS_RATE}% ceiling"
        ));
    }
    if annual_income.is_zero() {
        warnings.push("Annual income is zero; DSR and DTI reported as 0".into());
    }

    let mut totals = AnnualRepayment::ZERO;
    let mut new_loan_repayment = Decimal::ZERO;
    let mut existing_repayment = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(existing_loans.len() + 1);

    // -- New loan (stressed) --------------------------------------------------
    if let Some(loan) = new_loan.filter(|l| l.terms().is_active()) {
        let (repayment, detail) = assess_loan(&loan.terms(), Some(stress_rate), LoanSource::New)?;
        totals += repayment;
        new_loan_repayment = repayment.total();
        breakdown.push(detail);
    }

    // -- Existing loans (not stressed) ----------------------------------------
    let mut skipped = 0usize;
    for loan in existing_loans {
        let terms = loan.terms();
        if !terms.is_active() {
            skipped += 1;
            continue;
        }
        let source = LoanSource::Existing {
            id: loan.id.clone(),
        };
        let (repayment, detail) = assess_loan(&terms, None, source)?;
        totals += repayment;
        existing_repayment += repayment.total();
        breakdown.push(detail);
    }
    if skipped > 0 {
        warnings.push(format!(
            "{skipped} existing loan(s) with a non-positive balance were skipped"
        ));
    }
    if breakdown
        .iter()
        .any(|d| d.repayment_method == RepaymentMethod::Mixed)
    {
        warnings.push("Mixed repayment is approximated as bullet at maturity".into());
    }

    // -- Ratios ---------------------------------------------------------------
    let total_repayment = totals.total();
    let (dsr, dti) = if annual_income > Decimal::ZERO {
        (
            total_repayment / annual_income * dec!(100),
            (totals.annual_interest + new_loan_repayment) / annual_income * dec!(100),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let status = RiskStatus::classify(dsr);
    let contribution = contribution_shares(new_loan_repayment, existing_repayment, total_repayment);

    debug!(
        %annual_income,
        %total_repayment,
        %dsr,
        %dti,
        ?status,
        loans = breakdown.len(),
        "dsr/dti assessed"
    );

    let output = DsrDtiOutput {
        dsr: round_percent(dsr, 2),
        dti: round_percent(dti, 2),
        total_annual_repayment: round_currency(total_repayment),
        total_annual_interest: round_currency(totals.annual_interest),
        total_annual_principal: round_currency(totals.annual_principal),
        new_loan_annual_repayment: round_currency(new_loan_repayment),
        existing_loans_annual_repayment: round_currency(existing_repayment),
        status,
        message: status.message().to_string(),
        dti_status: RiskStatus::classify(dti),
        contribution,
        loan_breakdown: breakdown,
    };

    Ok((output, warnings))
}

fn assess_loan(
    terms: &LoanTerms,
    stress_rate: Option<Percent>,
    source: LoanSource,
) -> LoanDsrResult<(AnnualRepayment, LoanRepaymentDetail)> {
    let strategy = resolve_strategy(terms.loan_type, terms.repayment_method);
    let rate = effective_rate(terms.annual_rate, stress_rate);
    let repayment = strategy.first_year(terms.principal, rate, terms.term_months)?;

    debug!(
        loan_type = %terms.loan_type,
        method = %terms.repayment_method,
        ?strategy,
        %rate,
        principal = %repayment.annual_principal,
        interest = %repayment.annual_interest,
        "loan repayment resolved"
    );

    let detail = LoanRepaymentDetail {
        source,
        loan_type: terms.loan_type,
        repayment_method: terms.repayment_method,
        basis: dsr_basis(terms.loan_type, terms.repayment_method),
        strategy,
        effective_rate: rate,
        annual_principal: round_currency(repayment.annual_principal),
        annual_interest: round_currency(repayment.annual_interest),
        annual_repayment: round_currency(repayment.total()),
    };

    Ok((repayment, detail))
}

fn contribution_shares(
    new_loan_repayment: Money,
    existing_repayment: Money,
    total_repayment: Money,
) -> RepaymentContribution {
    if total_repayment <= Decimal::ZERO {
        return RepaymentContribution {
            new_loan_share: Decimal::ZERO,
            existing_loans_share: Decimal::ZERO,
        };
    }
    RepaymentContribution {
        new_loan_share: round_percent(new_loan_repayment / total_repayment * dec!(100), 1),
        existing_loans_share: round_percent(existing_repayment / total_repayment * dec!(100), 1),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(
    annual_income: Money,
    new_loan: Option<&NewLoan>,
    existing_loans: &[ExistingLoan],
    stress_rate: Percent,
) -> LoanDsrResult<()> {
    if annual_income < Decimal::ZERO {
        return Err(LoanDsrError::InvalidInput {
            field: "annual_income".into(),
            reason: "Annual income cannot be negative.".into(),
        });
    }
    if stress_rate < Decimal::ZERO {
        return Err(LoanDsrError::InvalidInput {
            field: "stress_rate".into(),
            reason: "Stress rate cannot be negative.".into(),
        });
    }
    if let Some(loan) = new_loan {
        validate_terms(&loan.terms(), "new_loan.interest_rate", "new_loan.term_months")?;
    }
    for (i, loan) in existing_loans.iter().enumerate() {
        validate_terms(
            &loan.terms(),
            &format!("existing_loans[{i}].interest_rate"),
            &format!("existing_loans[{i}].remaining_months"),
        )?;
    }
    Ok(())
}

/// Only loans that will be counted are checked.
fn validate_terms(terms: &LoanTerms, rate_field: &str, term_field: &str) -> LoanDsrResult<()> {
    if !terms.is_active() {
        return Ok(());
    }
    if terms.annual_rate < Decimal::ZERO {
        return Err(LoanDsrError::InvalidInput {
            field: rate_field.into(),
            reason: "Interest rate cannot be negative.".into(),
        });
    }
    if terms.term_months == 0 {
        return Err(LoanDsrError::InvalidInput {
            field: term_field.into(),
            reason: "Term must be at least one month for a loan with a positive principal."
                .into(),
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
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn mortgage_new_loan() -> NewLoan {
        NewLoan {
            loan_type: LoanType::Mortgage,
            amount: dec!(100_000_000),
            term_months: 360,
            interest_rate: dec!(4.5),
            repayment_method: RepaymentMethod::EqualInstallment,
        }
    }

    fn bullet_loan(id: &str, loan_type: LoanType, balance: Money, rate: Percent) -> ExistingLoan {
        ExistingLoan {
            id: Some(id.into()),
            loan_type,
            balance,
            interest_rate: rate,
            remaining_months: 24,
            repayment_method: RepaymentMethod::BulletAtMaturity,
        }
    }

    #[test]
    fn test_default_scenario() {
        let new_loan = mortgage_new_loan();
        let out = compute_dsr_dti(dec!(50_000_000), Some(&new_loan), &[], dec!(1.5)).unwrap();

        // 100M at 6.0% over 360 months, first twelve months
        assert_eq!(out.new_loan_annual_repayment, dec!(7_194_606));
        assert_eq!(out.existing_loans_annual_repayment, Decimal::ZERO);
        assert_eq!(out.total_annual_repayment, dec!(7_194_606));
        assert_eq!(out.total_annual_principal, dec!(1_228_012));
        assert_eq!(out.total_annual_interest, dec!(5_966_595));
        assert_eq!(out.dsr, dec!(14.39));
        assert_eq!(out.dti, dec!(26.32));
        assert_eq!(out.status, RiskStatus::Safe);
        assert_eq!(out.message, "DSR within 40% - loan can proceed");
        assert_eq!(out.contribution.new_loan_share, dec!(100.0));
    }

    #[test]
    fn test_zero_income_yields_zero_ratios() {
        let new_loan = mortgage_new_loan();
        let existing = vec![bullet_loan("a", LoanType::Credit, dec!(10_000_000), dec!(6.0))];
        let out = compute_dsr_dti(Decimal::ZERO, Some(&new_loan), &existing, dec!(1.5)).unwrap();
        assert_eq!(out.dsr, Decimal::ZERO);
        assert_eq!(out.dti, Decimal::ZERO);
        assert_eq!(out.status, RiskStatus::Safe);
        assert!(out.total_annual_repayment > Decimal::ZERO);
    }

    #[test]
    fn test_stress_applies_to_new_loan_only() {
        let existing = vec![bullet_loan("m", LoanType::Mortgage, dec!(100_000_000), dec!(4.0))];
        let new_loan = NewLoan {
            loan_type: LoanType::Mortgage,
            amount: dec!(100_000_000),
            term_months: 360,
            interest_rate: dec!(4.0),
            repayment_method: RepaymentMethod::BulletAtMaturity,
        };
        let low = compute_dsr_dti(dec!(60_000_000), Some(&new_loan), &existing, dec!(0)).unwrap();
        let high = compute_dsr_dti(dec!(60_000_000), Some(&new_loan), &existing, dec!(3)).unwrap();

        assert_eq!(low.existing_loans_annual_repayment, dec!(4_000_000));
        assert_eq!(high.existing_loans_annual_repayment, dec!(4_000_000));
        assert_eq!(low.new_loan_annual_repayment, dec!(4_000_000));
        assert_eq!(high.new_loan_annual_repayment, dec!(7_000_000));
    }

    #[test]
    fn test_dti_counts_new_loan_interest_twice() {
        let new_loan = NewLoan {
            loan_type: LoanType::Other,
            amount: dec!(10_000_000),
            term_months: 12,
            interest_rate: dec!(5.0),
            repayment_method: RepaymentMethod::BulletAtMaturity,
        };
        let existing = vec![bullet_loan("c", LoanType::Mortgage, dec!(20_000_000), dec!(5.0))];
        let out = compute_dsr_dti(dec!(10_000_000), Some(&new_loan), &existing, dec!(0)).unwrap();

        // Interest: new 500k + existing 1M; new loan repayment 500k
        assert_eq!(out.total_annual_interest, dec!(1_500_000));
        assert_eq!(out.dsr, dec!(15));
        assert_eq!(out.dti, dec!(20));
    }

    #[test]
    fn test_risk_classification_boundaries() {
        assert_eq!(RiskStatus::classify(dec!(40.00)), RiskStatus::Safe);
        assert_eq!(RiskStatus::classify(dec!(40.01)), RiskStatus::Danger);
        assert_eq!(RiskStatus::classify(dec!(35.00)), RiskStatus::Safe);
        assert_eq!(RiskStatus::classify(dec!(35.01)), RiskStatus::Warning);
        assert_eq!(RiskStatus::classify(Decimal::ZERO), RiskStatus::Safe);
    }

    #[test]
    fn test_danger_scenario() {
        // 45% of income goes to interest on a bullet mortgage
        let new_loan = NewLoan {
            loan_type: LoanType::Mortgage,
            amount: dec!(450_000_000),
            term_months: 360,
            interest_rate: dec!(4.0),
            repayment_method: RepaymentMethod::BulletAtMaturity,
        };
        let out = compute_dsr_dti(dec!(20_000_000), Some(&new_loan), &[], dec!(1.0)).unwrap();
        assert_eq!(out.dsr, dec!(112.5));
        assert_eq!(out.status, RiskStatus::Danger);
        assert_eq!(out.message, "Limit exceeded - DSR above 40%");
    }

    #[test]
    fn test_non_positive_balances_skipped() {
        let existing = vec![
            bullet_loan("zero", LoanType::Credit, Decimal::ZERO, dec!(9.0)),
            ExistingLoan {
                remaining_months: 0,
                interest_rate: dec!(-3.0),
                ..bullet_loan("negative", LoanType::Mortgage, dec!(-5_000_000), dec!(9.0))
            },
        ];
        let out = compute_dsr_dti(dec!(50_000_000), None, &existing, dec!(1.5)).unwrap();
        assert_eq!(out.total_annual_repayment, Decimal::ZERO);
        assert_eq!(out.dsr, Decimal::ZERO);
        assert!(out.loan_breakdown.is_empty());
        assert_eq!(out.contribution.new_loan_share, Decimal::ZERO);
    }

    #[test]
    fn test_zero_amount_new_loan_ignored() {
        let new_loan = NewLoan {
            amount: Decimal::ZERO,
            term_months: 0,
            ..mortgage_new_loan()
        };
        let out = compute_dsr_dti(dec!(50_000_000), Some(&new_loan), &[], dec!(1.5)).unwrap();
        assert_eq!(out.new_loan_annual_repayment, Decimal::ZERO);
        assert_eq!(out.dti, Decimal::ZERO);
    }

    #[test]
    fn test_zero_term_rejected() {
        let new_loan = NewLoan {
            term_months: 0,
            ..mortgage_new_loan()
        };
        let err = compute_dsr_dti(dec!(50_000_000), Some(&new_loan), &[], dec!(1.5)).unwrap_err();
        match err {
            LoanDsrError::InvalidInput { field, .. } => assert_eq!(field, "new_loan.term_months"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let err = compute_dsr_dti(dec!(-1), None, &[], dec!(1.5)).unwrap_err();
        assert!(matches!(err, LoanDsrError::InvalidInput { ref field, .. } if field == "annual_income"));

        let err = compute_dsr_dti(dec!(1), None, &[], dec!(-0.5)).unwrap_err();
        assert!(matches!(err, LoanDsrError::InvalidInput { ref field, .. } if field == "stress_rate"));

        let existing = vec![bullet_loan("x", LoanType::Credit, dec!(1_000), dec!(-1))];
        let err = compute_dsr_dti(dec!(1), None, &existing, dec!(1.5)).unwrap_err();
        assert!(
            matches!(err, LoanDsrError::InvalidInput { ref field, .. } if field == "existing_loans[0].interest_rate")
        );
    }

    #[test]
    fn test_breakdown_and_contribution() {
        let new_loan = NewLoan {
            loan_type: LoanType::Credit,
            amount: dec!(20_000_000),
            term_months: 36,
            interest_rate: dec!(6.5),
            repayment_method: RepaymentMethod::BulletAtMaturity,
        };
        let existing = vec![bullet_loan(
            "office",
            LoanType::StudioOffice,
            dec!(40_000_000),
            dec!(5.0),
        )];
        let out = compute_dsr_dti(dec!(100_000_000), Some(&new_loan), &existing, dec!(1.5)).unwrap();

        // New: 4M principal + 1.6M interest; existing: 5M principal + 2M interest
        assert_eq!(out.new_loan_annual_repayment, dec!(5_600_000));
        assert_eq!(out.existing_loans_annual_repayment, dec!(7_000_000));
        assert_eq!(out.loan_breakdown.len(), 2);
        assert_eq!(out.loan_breakdown[0].source, LoanSource::New);
        assert_eq!(out.loan_breakdown[0].basis, DsrBasis::FiveYearMaturity);
        assert_eq!(out.loan_breakdown[0].effective_rate, dec!(8.0));
        assert_eq!(
            out.loan_breakdown[1].source,
            LoanSource::Existing {
                id: Some("office".into())
            }
        );
        assert_eq!(out.loan_breakdown[1].basis, DsrBasis::EightYearMaturity);
        assert_eq!(out.contribution.new_loan_share, dec!(44.4));
        assert_eq!(out.contribution.existing_loans_share, dec!(55.6));
    }

    #[test]
    fn test_envelope_warnings() {
        let input = DsrDtiInput {
            annual_income: Decimal::ZERO,
            new_loan: None,
            existing_loans: vec![
                ExistingLoan {
                    repayment_method: RepaymentMethod::Mixed,
                    ..bullet_loan("mixed", LoanType::Mortgage, dec!(1_000_000), dec!(4.0))
                },
                bullet_loan("paid", LoanType::Mortgage, Decimal::ZERO, dec!(4.0)),
            ],
            market: MarketContext {
                stress_rate: dec!(6),
            },
        };
        let out = calculate_dsr_dti(&input).unwrap();
        assert_eq!(out.warnings.len(), 4);
        assert!(out.warnings.iter().any(|w| w.contains("ceiling")));
        assert!(out.warnings.iter().any(|w| w.contains("skipped")));
        assert!(out.warnings.iter().any(|w| w.contains("Mixed")));
        assert_eq!(out.result.existing_loans_annual_repayment, dec!(40_000));
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let json = r#"{ "annual_income": "50000000" }"#;
        let input: DsrDtiInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.market.stress_rate, DEFAULT_STRESS_RATE);
        assert!(input.new_loan.is_none());
        assert!(input.existing_loans.is_empty());
    }
}
