//! Error types for the commitment layer

use thiserror::Error;

/// Result type for commitment operations
pub type Result<T> = std::result::Result<T, CommitmentError>;

/// Errors that can occur in the commitment layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitmentError {
    /// Invalid commitment parameters
    #[error("Invalid commitment parameters: {0}")]
    InvalidParameters(String),

    /// The reference string does not hold enough G1 powers
    #[error("Reference string too small: required {required} points, available {available}")]
    ReferenceStringTooSmall { required: usize, available: usize },

    /// A commitment or group element is the point at infinity
    #[error("Degenerate commitment: {0}")]
    DegenerateCommitment(String),

    /// Malformed point or field encoding
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// I/O failure while reading or writing a reference string
    #[error("I/O error: {0}")]
    Io(String),

    /// Multi-scalar multiplication error
    #[error("Multi-scalar multiplication error: {0}")]
    MsmError(String),
}

impl From<std::io::Error> for CommitmentError {
    fn from(err: std::io::Error) -> Self {
        CommitmentError::Io(err.to_string())
    }
}
