use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanDsrError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanDsrError {
    fn from(e: serde_json::Error) -> Self {
        LoanDsrError::SerializationError(e.to_string())
    }
}
