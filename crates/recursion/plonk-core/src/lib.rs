//! # PLONK Core
//!
//! Keys, prover and native verifier for circuits built with
//! [`plonk_arith::Composer`]. Proofs use KZG commitments from the
//! [`commitments`] crate and a Fiat-Shamir transcript scheduled by a
//! [`Manifest`], so that an in-circuit verifier can replay exactly the same
//! sequence of absorbs and squeezes.
//!
//! ## Protocol outline
//!
//! 1. Commit to the three wire polynomials; derive `beta`, `gamma`
//! 2. Commit to the permutation grand product `z`; derive `alpha`
//! 3. Commit to the quotient `t` in three chunks; derive `zeta`
//! 4. Send sixteen evaluations at `zeta` and `zeta * omega`; derive `nu`
//! 5. Send two batched opening witnesses; derive the separator `u`
//!
//! The verifier reduces everything to a pair of G1 points `(P0, P1)` checked
//! with a single pairing equation.
//!
//! Only arithmetic gates get selector polynomials. Hash-round and curve gates
//! are deferred: their wires are appended to the public inputs and the
//! verifier checks those gates natively.

pub mod circuit;
pub mod composer;
pub mod errors;
pub mod manifest;
pub mod polynomial;
pub mod proof;
pub mod prover;
pub mod proving_key;
pub mod transcript;
pub mod verification_key;
pub mod verifier;

// Re-export key types
pub use circuit::Circuit;
pub use composer::PlonkComposer;
pub use errors::{PlonkError, Result};
pub use manifest::{Manifest, ManifestCursor, EVALUATION_LABELS};
pub use polynomial::{DensePolynomial, Domain};
pub use proof::{Evaluations, Proof};
pub use prover::{Prover, ProverKind};
pub use proving_key::{ProvingKey, Witness, COSET_GENERATORS};
pub use transcript::Transcript;
pub use verification_key::VerificationKey;
pub use verifier::{Verifier, VerifierKind};

/// Re-export the circuit builder and commitments for convenience
pub use commitments;
pub use plonk_arith;

/// BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 G1 element
pub type GroupElement = bls12_381::G1Affine;
