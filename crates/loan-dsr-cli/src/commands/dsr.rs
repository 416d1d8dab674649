use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_dsr_core::dsr::{
    self, DsrDtiInput, ExistingLoan, LoanRepaymentInput, LoanTerms, LoanType, MarketContext,
    NewLoan, RepaymentMethod,
};

use crate::input;

/// Arguments for a full DSR/DTI assessment
#[derive(Args)]
pub struct DsrDtiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Applicant's annual income
    #[arg(long)]
    pub annual_income: Option<Decimal>,

    /// Stress add-on rate in percent, applied to the new loan only
    #[arg(long, env = "DSR_STRESS_RATE", default_value = "1.5")]
    pub stress_rate: Decimal,

    /// New loan type (mortgage, studio-office, credit, non-housing-collateral, other)
    #[arg(long, default_value = "mortgage")]
    pub loan_type: LoanType,

    /// New loan amount; omit to assess existing loans only
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// New loan term in months
    #[arg(long, default_value_t = 360)]
    pub term_months: u32,

    /// New loan nominal annual interest rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// New loan repayment method (equal-installment, equal-principal, bullet-at-maturity, mixed)
    #[arg(long, default_value = "equal-installment")]
    pub repayment_method: RepaymentMethod,

    /// Path to a JSON array of existing loans
    #[arg(long)]
    pub existing: Option<String>,
}

/// Arguments for a single-loan repayment
#[derive(Args)]
pub struct LoanRepaymentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan type
    #[arg(long, default_value = "mortgage")]
    pub loan_type: LoanType,

    /// Principal or outstanding balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Term (or remaining term) in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Repayment method
    #[arg(long, default_value = "equal-installment")]
    pub repayment_method: RepaymentMethod,

    /// Stress add-on rate in percent (only for a prospective loan)
    #[arg(long)]
    pub stress_rate: Option<Decimal>,
}

/// Arguments for the basis lookup
#[derive(Args)]
pub struct BasisArgs {
    /// Loan type
    #[arg(long)]
    pub loan_type: LoanType,

    /// Repayment method
    #[arg(long)]
    pub repayment_method: RepaymentMethod,
}

pub fn run_dsr_dti(args: DsrDtiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dsr_input: DsrDtiInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let new_loan = match args.amount {
                Some(amount) => Some(NewLoan {
                    loan_type: args.loan_type,
                    amount,
                    term_months: args.term_months,
                    interest_rate: args
                        .interest_rate
                        .ok_or("--interest-rate is required with --amount")?,
                    repayment_method: args.repayment_method,
                }),
                None => None,
            };
            let existing_loans: Vec<ExistingLoan> = match args.existing {
                Some(ref path) => input::file::read_json(path)?,
                None => Vec::new(),
            };
            DsrDtiInput {
                annual_income: args
                    .annual_income
                    .ok_or("--annual-income is required (or provide --input)")?,
                new_loan,
                existing_loans,
                market: MarketContext {
                    stress_rate: args.stress_rate,
                },
            }
        }
    };

    let result = dsr::calculate_dsr_dti(&dsr_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_loan_repayment(args: LoanRepaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let repayment_input: LoanRepaymentInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanRepaymentInput {
            loan: LoanTerms {
                loan_type: args.loan_type,
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate: args
                    .interest_rate
                    .ok_or("--interest-rate is required (or provide --input)")?,
                term_months: args
                    .term_months
                    .ok_or("--term-months is required (or provide --input)")?,
                repayment_method: args.repayment_method,
            },
            stress_rate: args.stress_rate,
        },
    };

    let result = dsr::calculate_loan_repayment(&repayment_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_basis(args: BasisArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let strategy = dsr::resolve_strategy(args.loan_type, args.repayment_method);
    Ok(json!({
        "loan_type": args.loan_type,
        "repayment_method": args.repayment_method,
        "strategy": strategy,
        "basis_description": dsr::get_basis_description(args.loan_type, args.repayment_method),
    }))
}
