//! Inner proof production and its native sanity check

use crate::variants::VariantConfig;
use crate::{RecursionError, Result};
use plonk_arith::Composer;
use plonk_core::{PlonkComposer, Proof, ProvingKey, VerificationKey, Verifier};
use std::sync::Arc;

/// Proves a finished inner circuit with the prover chosen for the variant
/// pair, caching its keys
#[derive(Debug)]
pub struct InnerProofProducer {
    composer: Composer,
    config: VariantConfig,
    proving_key: Option<Arc<ProvingKey>>,
    verification_key: Option<Arc<VerificationKey>>,
}

impl InnerProofProducer {
    pub fn new(composer: Composer, config: VariantConfig) -> Self {
        Self {
            composer,
            config,
            proving_key: None,
            verification_key: None,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    /// Compute the proving key once, finalizing the composer
    pub fn proving_key(&mut self) -> Result<Arc<ProvingKey>> {
        if let Some(key) = &self.proving_key {
            return Ok(key.clone());
        }
        let key = self.composer.compute_proving_key()?;
        self.proving_key = Some(key.clone());
        Ok(key)
    }

    /// Verification key of the inner circuit
    pub fn compute_verification_key(&mut self) -> Result<Arc<VerificationKey>> {
        if let Some(key) = &self.verification_key {
            return Ok(key.clone());
        }
        let proving_key = self.proving_key()?;
        let key = Arc::new(VerificationKey::from_proving_key(&proving_key)?);
        self.verification_key = Some(key.clone());
        Ok(key)
    }

    /// Prove the inner circuit
    ///
    /// Fails before proving if the composer already recorded a violated
    /// constraint.
    pub fn prove(&mut self) -> Result<Proof> {
        if self.composer.failed() {
            return Err(RecursionError::InnerCircuitUnsatisfied(
                self.composer.err().to_string(),
            ));
        }
        let key = self.proving_key()?;
        let prover = self.composer.create_prover_with_key(self.config.prover, key)?;
        Ok(prover.construct_proof()?)
    }

    /// Run the native verifier matching the prover
    pub fn native_verify(&mut self, proof: &Proof) -> Result<bool> {
        let key = self.compute_verification_key()?;
        Ok(Verifier::new(self.config.verifier, key).verify_proof(proof)?)
    }

    /// Prove, then refuse any proof the native verifier rejects
    #[tracing::instrument(skip_all, name = "InnerProofProducer::prove_and_verify", fields(prover = ?self.config.prover))]
    pub fn prove_and_verify(&mut self) -> Result<(Arc<VerificationKey>, Proof)> {
        let key = self.compute_verification_key()?;
        let proof = self.prove()?;
        if !self.native_verify(&proof)? {
            return Err(RecursionError::NativeVerificationFailed);
        }
        tracing::info!(
            circuit_size = key.circuit_size,
            public_inputs = proof.public_inputs.len(),
            "inner proof verified natively"
        );
        Ok((key, proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_inner_circuit, select_variants, Scalar};
    use commitments::{CommitmentError, ReferenceString};
    use ff::Field;
    use plonk_arith::ComposerVariant;
    use plonk_core::PlonkError;

    fn producer(inner: ComposerVariant, outer: ComposerVariant, c: u64, srs_size: usize) -> InnerProofProducer {
        let srs = ReferenceString::insecure_from_seed(srs_size, b"inner-producer").unwrap();
        let mut cs = Composer::new(inner, Arc::new(srs));
        let inputs = [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(c)];
        create_inner_circuit(&mut cs, &inputs);
        InnerProofProducer::new(cs, select_variants(inner, outer).unwrap())
    }

    #[test]
    fn test_prove_and_verify_every_pair() {
        for inner in [ComposerVariant::Standard, ComposerVariant::Ultra] {
            for outer in [ComposerVariant::Standard, ComposerVariant::Ultra] {
                let mut producer = producer(inner, outer, 12, 16);
                let (key, proof) = producer.prove_and_verify().unwrap();
                assert_eq!(proof.public_inputs, vec![Scalar::from(7u64), Scalar::from(12u64)]);
                assert_eq!(key.num_public_inputs, 2);
            }
        }
    }

    #[test]
    fn test_keys_are_cached() {
        let mut producer = producer(ComposerVariant::Ultra, ComposerVariant::Ultra, 12, 16);
        let first = producer.compute_verification_key().unwrap();
        let second = producer.compute_verification_key().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(producer.composer().is_finalized());
    }

    #[test]
    fn test_unsatisfied_inner_circuit_rejected() {
        let mut producer = producer(ComposerVariant::Ultra, ComposerVariant::Ultra, 13, 16);
        assert_eq!(
            producer.prove().unwrap_err(),
            RecursionError::InnerCircuitUnsatisfied("c != a + b".to_string())
        );
    }

    #[test]
    fn test_native_verify_rejects_tampered_proof() {
        let mut producer = producer(ComposerVariant::Ultra, ComposerVariant::Standard, 12, 16);
        let mut proof = producer.prove().unwrap();
        assert!(producer.native_verify(&proof).unwrap());
        proof.evaluations.z += Scalar::ONE;
        assert!(!producer.native_verify(&proof).unwrap());
    }

    #[test]
    fn test_small_reference_string_propagates() {
        let mut producer = producer(ComposerVariant::Ultra, ComposerVariant::Ultra, 12, 4);
        assert!(matches!(
            producer.compute_verification_key(),
            Err(RecursionError::Plonk(PlonkError::Commitment(
                CommitmentError::ReferenceStringTooSmall { .. }
            )))
        ));
    }
}
