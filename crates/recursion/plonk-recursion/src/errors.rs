//! Error types for recursion

use plonk_arith::{ArithError, ComposerVariant};
use plonk_core::PlonkError;
use thiserror::Error;

/// Result type for recursion operations
pub type Result<T> = std::result::Result<T, RecursionError>;

/// Errors that abort building a recursive circuit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecursionError {
    /// The inner proof was rejected by its own native verifier
    #[error("Native verification failed")]
    NativeVerificationFailed,

    /// The aggregated pairing check does not hold
    #[error("inner proof result != 1")]
    PairingMismatch,

    /// A constraint of the outer circuit is violated
    #[error("outer composer failed: {0}")]
    OuterCircuitUnsatisfied(String),

    /// The inner circuit does not satisfy its own constraints
    #[error("inner composer failed: {0}")]
    InnerCircuitUnsatisfied(String),

    /// No prover, verifier and settings triple for this pair of variants
    #[error("Unsupported variant pair: inner {inner:?}, outer {outer:?}")]
    UnsupportedVariantPair {
        inner: ComposerVariant,
        outer: ComposerVariant,
    },

    /// A commitment is the point at infinity
    #[error("Degenerate commitment: {0}")]
    DegenerateCommitment(String),

    /// Witnesses can no longer be added to the outer composer
    #[error("Composer already finalized")]
    ComposerFinalized,

    /// The in-circuit transcript diverges from its manifest
    #[error("Transcript error: {0}")]
    Transcript(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prover or native verifier error
    #[error("PLONK error: {0}")]
    Plonk(#[from] PlonkError),

    /// Circuit-builder error
    #[error("Circuit error: {0}")]
    Arith(ArithError),

    /// Commitment error
    #[error("Commitment error: {0}")]
    Commitment(#[from] commitments::CommitmentError),
}

impl From<ArithError> for RecursionError {
    fn from(err: ArithError) -> Self {
        match err {
            ArithError::PointAtInfinity => RecursionError::DegenerateCommitment(
                "point at infinity in the outer circuit".to_string(),
            ),
            other => RecursionError::Arith(other),
        }
    }
}
