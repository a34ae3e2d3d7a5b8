//! # Recursion Benchmarks
//!
//! Criterion benchmarks for the commitment layer, the PLONK prover and
//! verifier, and the recursive circuit.
//!
//! ## Usage
//!
//! ```bash
//! cargo bench -p recursion-benches
//! cargo bench -p recursion-benches -- recursive_circuit
//! ```

pub mod utils;

// Re-export for convenience
pub use commitments;
pub use plonk_arith;
pub use plonk_core;
pub use plonk_recursion;
