//! Debt-service (DSR) and debt-to-income (DTI) assessment.
//!
//! Pipeline: the aggregator resolves each loan's strategy, the strategy
//! computes the first-year repayment, and the aggregator sums the results
//! into ratios and a risk tier. Every call is a pure function of its inputs.

pub mod aggregate;
pub mod amortization;
pub mod loan;
pub mod rules;
pub mod single;

pub use aggregate::{
    calculate_dsr_dti, compute_dsr_dti, DsrDtiInput, DsrDtiOutput, MarketContext, RiskStatus,
};
pub use amortization::AnnualRepayment;
pub use loan::{ExistingLoan, LoanTerms, LoanType, NewLoan, RepaymentMethod};
pub use rules::{get_basis_description, resolve_strategy, AmortizationStrategy, DsrBasis};
pub use single::{calculate_loan_repayment, LoanRepaymentInput, LoanRepaymentOutput};
