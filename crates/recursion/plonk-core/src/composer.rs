//! Prover and verifier construction from a composer

use crate::prover::{Prover, ProverKind};
use crate::proving_key::ProvingKey;
use crate::verification_key::VerificationKey;
use crate::verifier::{Verifier, VerifierKind};
use crate::{PlonkError, Result};
use plonk_arith::{Composer, ComposerVariant};
use std::sync::Arc;

/// Key generation and prover/verifier factories for a [`Composer`]
///
/// Every factory finalizes the composer first. Keys are recomputed on each
/// call; callers that need them more than once should keep the returned
/// [`Arc`]s and use [`PlonkComposer::create_prover_with_key`].
pub trait PlonkComposer {
    /// Finalize and preprocess the circuit
    fn compute_proving_key(&mut self) -> Result<Arc<ProvingKey>>;

    /// Finalize, preprocess and commit to the circuit
    fn compute_verification_key(&mut self) -> Result<Arc<VerificationKey>>;

    /// Prover over an already computed key
    fn create_prover_with_key(&self, kind: ProverKind, key: Arc<ProvingKey>) -> Result<Prover>;

    /// Prover of the given kind; the kind must match the composer variant
    fn create_prover_of_kind(&mut self, kind: ProverKind) -> Result<Prover>;

    /// Prover using the composer variant's own transcript hash
    fn create_prover(&mut self) -> Result<Prover>;

    /// Prover for an Ultra circuit that uses the standard transcript hash
    fn create_ultra_to_standard_prover(&mut self) -> Result<Prover>;

    /// Verifier of the given kind; the kind must match the composer variant
    fn create_verifier_of_kind(&mut self, kind: VerifierKind) -> Result<Verifier>;

    /// Verifier using the composer variant's own transcript hash
    fn create_verifier(&mut self) -> Result<Verifier>;

    /// Verifier for proofs made by [`PlonkComposer::create_ultra_to_standard_prover`]
    fn create_ultra_to_standard_verifier(&mut self) -> Result<Verifier>;
}

fn check_variant(variant: ComposerVariant, expected: ComposerVariant, kind: &str) -> Result<()> {
    if variant != expected {
        return Err(PlonkError::InvalidCircuit(format!(
            "{} requires a {:?} composer, got {:?}",
            kind, expected, variant
        )));
    }
    Ok(())
}

impl PlonkComposer for Composer {
    fn compute_proving_key(&mut self) -> Result<Arc<ProvingKey>> {
        self.finalize();
        Ok(Arc::new(ProvingKey::compute(self)?))
    }

    fn compute_verification_key(&mut self) -> Result<Arc<VerificationKey>> {
        let pk = self.compute_proving_key()?;
        Ok(Arc::new(VerificationKey::from_proving_key(&pk)?))
    }

    fn create_prover_with_key(&self, kind: ProverKind, key: Arc<ProvingKey>) -> Result<Prover> {
        check_variant(
            self.variant(),
            kind.composer_variant(),
            &format!("{:?} prover", kind),
        )?;
        let witness = key.witness(self)?;
        Ok(Prover::new(kind, key, witness))
    }

    fn create_prover_of_kind(&mut self, kind: ProverKind) -> Result<Prover> {
        check_variant(
            self.variant(),
            kind.composer_variant(),
            &format!("{:?} prover", kind),
        )?;
        let key = self.compute_proving_key()?;
        self.create_prover_with_key(kind, key)
    }

    fn create_prover(&mut self) -> Result<Prover> {
        let kind = match self.variant() {
            ComposerVariant::Standard => ProverKind::Standard,
            ComposerVariant::Ultra => ProverKind::Ultra,
        };
        self.create_prover_of_kind(kind)
    }

    fn create_ultra_to_standard_prover(&mut self) -> Result<Prover> {
        self.create_prover_of_kind(ProverKind::UltraToStandard)
    }

    fn create_verifier_of_kind(&mut self, kind: VerifierKind) -> Result<Verifier> {
        check_variant(
            self.variant(),
            kind.composer_variant(),
            &format!("{:?} verifier", kind),
        )?;
        let key = self.compute_verification_key()?;
        Ok(Verifier::new(kind, key))
    }

    fn create_verifier(&mut self) -> Result<Verifier> {
        let kind = match self.variant() {
            ComposerVariant::Standard => VerifierKind::Standard,
            ComposerVariant::Ultra => VerifierKind::Ultra,
        };
        self.create_verifier_of_kind(kind)
    }

    fn create_ultra_to_standard_verifier(&mut self) -> Result<Verifier> {
        self.create_verifier_of_kind(VerifierKind::UltraToStandard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commitments::ReferenceString;

    fn composer(variant: ComposerVariant) -> Composer {
        let srs = ReferenceString::insecure_from_seed(16, b"plonk-composer-tests").unwrap();
        Composer::new(variant, Arc::new(srs))
    }

    #[test]
    fn test_factories_finalize() {
        let mut cs = composer(ComposerVariant::Standard);
        assert!(!cs.is_finalized());
        cs.compute_verification_key().unwrap();
        assert!(cs.is_finalized());
    }

    #[test]
    fn test_kind_must_match_variant() {
        let mut standard = composer(ComposerVariant::Standard);
        assert!(matches!(
            standard.create_ultra_to_standard_prover(),
            Err(PlonkError::InvalidCircuit(_))
        ));
        assert!(matches!(
            standard.create_verifier_of_kind(VerifierKind::Ultra),
            Err(PlonkError::InvalidCircuit(_))
        ));
        assert_eq!(standard.create_prover().unwrap().kind(), ProverKind::Standard);

        let mut ultra = composer(ComposerVariant::Ultra);
        assert_eq!(ultra.create_prover().unwrap().kind(), ProverKind::Ultra);
        assert_eq!(
            ultra.create_ultra_to_standard_verifier().unwrap().kind(),
            VerifierKind::UltraToStandard
        );
    }
}
