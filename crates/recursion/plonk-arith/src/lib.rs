//! # PLONK Arithmetic
//!
//! Circuit builder for the recursive PLONK stack. A [`Composer`] owns the
//! witness vector, the gate list, copy constraints and the public-input order.
//! Gadgets on top of it:
//!
//! - [`FieldVar`]: scalar-field values with constant folding
//! - [`G1Var`]: BLS12-381 G1 points as four 192-bit limbs
//! - [`CircuitSponge`]: the Fiat-Shamir sponge replayed with gates
//!
//! Constraint violations never panic. They set the composer's failure flag,
//! which callers inspect with [`Composer::failed`] once building is done.

pub mod composer;
pub mod curve;
pub mod errors;
pub mod field;
pub mod gates;
pub mod hash;
pub mod variant;

// Re-export key types
pub use composer::Composer;
pub use curve::G1Var;
pub use errors::{ArithError, Result};
pub use field::FieldVar;
pub use gates::{ArithmeticGate, Gate, PointWires};
pub use hash::CircuitSponge;
pub use variant::ComposerVariant;

/// Re-export commitments for convenience
pub use commitments;

/// BLS12-381 scalar field
pub type Scalar = bls12_381::Scalar;

/// BLS12-381 G1 element
pub type GroupElement = bls12_381::G1Affine;
