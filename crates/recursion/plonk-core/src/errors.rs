//! Error types for the PLONK prover and verifier

use thiserror::Error;

/// Result type for PLONK operations
pub type Result<T> = std::result::Result<T, PlonkError>;

/// Errors that can occur while proving or verifying
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlonkError {
    /// Commitment error
    #[error("Commitment error: {0}")]
    Commitment(#[from] commitments::CommitmentError),

    /// Circuit-builder error
    #[error("Circuit error: {0}")]
    Arith(#[from] plonk_arith::ArithError),

    /// Invalid circuit
    #[error("Invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Polynomial arithmetic failed
    #[error("Polynomial error: {0}")]
    Polynomial(String),

    /// Proof generation failed
    #[error("Proof generation failed: {0}")]
    ProofGenerationFailed(String),

    /// Malformed proof
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// A commitment is the point at infinity
    #[error("Degenerate commitment: {0}")]
    DegenerateCommitment(String),

    /// Transcript does not follow its manifest
    #[error("Transcript error: {0}")]
    Transcript(String),
}
