//! # Commitments for recursive PLONK
//!
//! This crate provides the commitment layer shared by the prover, the native
//! verifier and the in-circuit verifier:
//!
//! - [`ReferenceString`]: structured reference string (powers of tau) with
//!   precomputed G2 lines for the final pairing check
//! - [`KzgCommitmentEngine`]: KZG polynomial commitments over BLS12-381
//! - [`msm`]: multi-scalar multiplication
//! - [`transcript`]: the algebraic Fiat-Shamir sponge in its two flavours
//! - [`limbs`]: the four-limb encoding of G1 points used by transcripts and circuits

pub mod commitment_engine;
pub mod errors;
pub mod limbs;
pub mod msm;
pub mod pairing_check;
pub mod reference_string;
pub mod transcript;

// Re-export key types
pub use commitment_engine::{CommitmentEngine, KzgCommitmentEngine};
pub use errors::{CommitmentError, Result};
pub use limbs::{g1_from_limbs, g1_to_limbs, LIMB_BITS, NUM_LIMBS_PER_POINT};
pub use pairing_check::{pairing_check, reduce_opening};
pub use reference_string::{PrecomputedG2Lines, ReferenceString, VerifierReferenceString};
pub use transcript::{HashKind, Sponge};

/// BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 G1 element used for commitments
pub type GroupElement = bls12_381::G1Affine;

/// BLS12-381 projective G1 element
pub type GroupProjective = bls12_381::G1Projective;
