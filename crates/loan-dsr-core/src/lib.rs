pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "dsr")]
pub mod dsr;

pub use error::LoanDsrError;
pub use types::*;

/// Standard result type for all loan-dsr operations
pub type LoanDsrResult<T> = Result<T, LoanDsrError>;
