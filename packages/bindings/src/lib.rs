use napi::Result as NapiResult;
use napi_derive::napi;

use loan_dsr_core::dsr::{self, DsrDtiInput, LoanRepaymentInput, LoanType, RepaymentMethod};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// DSR / DTI
// ---------------------------------------------------------------------------

#[napi]
pub fn dsr_dti(input_json: String) -> NapiResult<String> {
    let input: DsrDtiInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dsr::calculate_dsr_dti(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_repayment(input_json: String) -> NapiResult<String> {
    let input: LoanRepaymentInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dsr::calculate_loan_repayment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn basis_description(loan_type: String, repayment_method: String) -> NapiResult<String> {
    let loan_type: LoanType = loan_type.parse().map_err(to_napi_error)?;
    let method: RepaymentMethod = repayment_method.parse().map_err(to_napi_error)?;
    Ok(dsr::get_basis_description(loan_type, method).to_string())
}
