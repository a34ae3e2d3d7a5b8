//! # PLONK Recursion
//!
//! Verifies a PLONK proof inside another PLONK circuit.
//!
//! The inner circuit proves `c == a + b`. Its proof is checked natively, then
//! the verifier is re-expressed as constraints of an outer circuit: the
//! transcript is replayed with in-circuit hashing, the quotient identity is
//! enforced with outer gates, and the KZG openings are folded into a pair of
//! points `(P0, P1)`. The final pairing `e(P0, [1]_2) * e(P1, [tau]_2) == 1`
//! is deferred: the points become public inputs of the outer circuit, so
//! whoever verifies the outer proof also settles the inner one.
//!
//! ## Example
//!
//! ```no_run
//! use plonk_recursion::{RecursiveCircuit, Scalar};
//! use plonk_arith::ComposerVariant;
//!
//! let inputs = [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(12u64)];
//! let outer = RecursiveCircuit::generate("crs/bls12_381.srs", inputs, ComposerVariant::Standard)?;
//! assert_eq!(outer.num_public_inputs(), 10);
//! # Ok::<(), plonk_recursion::RecursionError>(())
//! ```

pub mod aggregation_state;
pub mod circuit;
pub mod config;
pub mod errors;
pub mod inner_circuit;
pub mod producer;
pub mod recursive_verifier;
pub mod transcript;
pub mod variants;
pub mod verification_key;

pub use aggregation_state::AggregationState;
pub use circuit::RecursiveCircuit;
pub use config::RecursionConfig;
pub use errors::{RecursionError, Result};
pub use inner_circuit::{create_inner_circuit, InnerCircuit};
pub use producer::InnerProofProducer;
pub use recursive_verifier::verify_proof;
pub use transcript::CircuitTranscript;
pub use variants::{select_variants, RecursiveSettings, VariantConfig};
pub use verification_key::CircuitVerificationKey;

/// BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 G1 element
pub type GroupElement = bls12_381::G1Affine;
