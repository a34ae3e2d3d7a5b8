//! The recursive circuit
//!
//! Builds and proves the inner circuit, then builds an outer circuit that
//! verifies the inner proof and exposes the resulting aggregation state:
//!
//! 1. pick the prover, verifier and recursive settings for the variant pair
//! 2. prove `c == a + b` and check the proof natively
//! 3. lift the inner verification key into the outer circuit
//! 4. verify the proof in circuit, producing `(P0, P1)`
//! 5. check the deferred pairing natively and export `P0`, `P1` as public
//!    inputs

use crate::config::RecursionConfig;
use crate::producer::InnerProofProducer;
use crate::{
    create_inner_circuit, select_variants, verify_proof, CircuitVerificationKey, RecursionError,
    Result, Scalar,
};
use commitments::ReferenceString;
use plonk_arith::{Composer, ComposerVariant};
use plonk_core::Manifest;
use std::path::Path;
use std::sync::Arc;

/// Entry points for building the recursive circuit
pub struct RecursiveCircuit;

impl RecursiveCircuit {
    /// Build the outer circuit for `inputs = [a, b, c]`
    ///
    /// The inner circuit uses [`ComposerVariant::MAX`]. The returned outer
    /// composer is satisfied; its public inputs are `b`, `c`, then the eight
    /// limbs of `P0` and `P1`.
    pub fn generate(
        srs_path: impl AsRef<Path>,
        inputs: [Scalar; 3],
        outer_variant: ComposerVariant,
    ) -> Result<Composer> {
        let reference_string = Arc::new(ReferenceString::read_from_path(srs_path)?);
        Self::generate_with_reference_string(
            reference_string,
            inputs,
            ComposerVariant::MAX,
            outer_variant,
        )
    }

    /// [`Self::generate`] with the variants and path taken from `config`
    pub fn from_config(config: &RecursionConfig, inputs: [Scalar; 3]) -> Result<Composer> {
        config.validate()?;
        let reference_string = Arc::new(ReferenceString::read_from_path(&config.srs_path)?);
        Self::generate_with_reference_string(
            reference_string,
            inputs,
            config.inner_variant,
            config.outer_variant,
        )
    }

    /// Build with an already loaded reference string shared by both circuits
    #[tracing::instrument(
        skip(reference_string, inputs),
        name = "RecursiveCircuit::generate",
        fields(srs_size = reference_string.size())
    )]
    pub fn generate_with_reference_string(
        reference_string: Arc<ReferenceString>,
        inputs: [Scalar; 3],
        inner_variant: ComposerVariant,
        outer_variant: ComposerVariant,
    ) -> Result<Composer> {
        let config = select_variants(inner_variant, outer_variant)?;

        let mut inner = Composer::new(inner_variant, reference_string.clone());
        create_inner_circuit(&mut inner, &inputs);
        if inner.failed() {
            return Err(RecursionError::InnerCircuitUnsatisfied(inner.err().to_string()));
        }

        let mut producer = InnerProofProducer::new(inner, config);
        let (inner_key, proof) = producer.prove_and_verify()?;

        let mut outer = Composer::new(outer_variant, reference_string);
        let key = CircuitVerificationKey::from_witness(&mut outer, &inner_key)?;
        let manifest = Manifest::create(inner_key.num_public_inputs);
        let state = verify_proof(&mut outer, &key, &manifest, &proof, config.settings, None)?;

        if !state.pairing_check(key.reference_string().precomputed_g2_lines())? {
            return Err(RecursionError::PairingMismatch);
        }
        state.add_proof_outputs_as_public_inputs(&mut outer);

        if outer.failed() {
            return Err(RecursionError::OuterCircuitUnsatisfied(outer.err().to_string()));
        }
        outer
            .check_circuit()
            .map_err(|err| RecursionError::OuterCircuitUnsatisfied(err.to_string()))?;

        tracing::info!(
            gates = outer.num_gates(),
            variables = outer.num_variables(),
            public_inputs = outer.num_public_inputs(),
            "recursive circuit built"
        );
        Ok(outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srs() -> Arc<ReferenceString> {
        Arc::new(ReferenceString::insecure_from_seed(16, b"recursive-circuit").unwrap())
    }

    fn inputs(c: u64) -> [Scalar; 3] {
        [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(c)]
    }

    #[test]
    fn test_generate_max_pair() {
        let outer = RecursiveCircuit::generate_with_reference_string(
            srs(),
            inputs(12),
            ComposerVariant::MAX,
            ComposerVariant::MAX,
        )
        .unwrap();
        assert!(!outer.failed());
        assert_eq!(outer.num_public_inputs(), 10);
        assert!(!outer.is_finalized());
    }

    #[test]
    fn test_wrong_sum_aborts_before_proving() {
        let err = RecursiveCircuit::generate_with_reference_string(
            srs(),
            inputs(13),
            ComposerVariant::Ultra,
            ComposerVariant::Standard,
        )
        .unwrap_err();
        assert_eq!(err, RecursionError::InnerCircuitUnsatisfied("c != a + b".to_string()));
    }

    #[test]
    fn test_missing_reference_string_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RecursiveCircuit::generate(dir.path().join("absent.srs"), inputs(12), ComposerVariant::Ultra),
            Err(RecursionError::Commitment(_))
        ));
    }
}
