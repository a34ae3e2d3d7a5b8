//! Error types for circuit construction

use crate::ComposerVariant;
use commitments::HashKind;
use thiserror::Error;

/// Result type for circuit-builder operations
pub type Result<T> = std::result::Result<T, ArithError>;

/// Errors that can occur while building or checking a circuit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArithError {
    /// Commitment layer error (reference string loading, limb encoding)
    #[error("Commitment error: {0}")]
    Commitment(#[from] commitments::CommitmentError),

    /// The point at infinity cannot be represented in-circuit
    #[error("Point at infinity has no in-circuit representation")]
    PointAtInfinity,

    /// Division by a zero-valued field element
    #[error("Division by zero")]
    DivisionByZero,

    /// The composer variant cannot evaluate the requested transcript hash
    #[error("{variant:?} composer cannot evaluate the {kind:?} transcript hash")]
    UnsupportedHash {
        kind: HashKind,
        variant: ComposerVariant,
    },

    /// Invalid circuit
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// A gate or copy constraint is not satisfied
    #[error("Unsatisfied constraint: {0}")]
    Unsatisfied(String),
}
