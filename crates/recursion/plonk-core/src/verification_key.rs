//! Verification key

use crate::polynomial::Domain;
use crate::proving_key::ProvingKey;
use crate::{GroupElement, PlonkError, Result};
use commitments::{CommitmentEngine, KzgCommitmentEngine, VerifierReferenceString};
use plonk_arith::Gate;
use rayon::prelude::*;
use std::sync::Arc;

/// Commitments to the preprocessed polynomials of a circuit
#[derive(Debug, Clone)]
pub struct VerificationKey {
    pub circuit_size: usize,
    /// Declared public inputs followed by the deferred-gate wires
    pub num_public_inputs: usize,
    /// Gates the verifier checks on the trailing public inputs
    pub deferred_gates: Vec<Gate>,
    pub num_deferred_values: usize,
    pub q_m: GroupElement,
    pub q_1: GroupElement,
    pub q_2: GroupElement,
    pub q_3: GroupElement,
    pub q_c: GroupElement,
    pub sigma: [GroupElement; 3],
    pub reference_string: Arc<VerifierReferenceString>,
}

impl VerificationKey {
    /// Commit to the selector and permutation polynomials of `pk`
    pub fn from_proving_key(pk: &ProvingKey) -> Result<Self> {
        let params = pk.reference_string.clone();
        let polynomials = [
            &pk.q_m, &pk.q_1, &pk.q_2, &pk.q_3, &pk.q_c, &pk.sigma[0], &pk.sigma[1], &pk.sigma[2],
        ];
        let points = polynomials
            .par_iter()
            .map(|p| KzgCommitmentEngine::commit(&params, p.coeffs()))
            .collect::<commitments::Result<Vec<_>>>()?;

        let [q_m, q_1, q_2, q_3, q_c, s_1, s_2, s_3]: [GroupElement; 8] =
            points.try_into().map_err(|_| {
                PlonkError::InvalidCircuit("unexpected number of key commitments".to_string())
            })?;

        Ok(Self {
            circuit_size: pk.circuit_size,
            num_public_inputs: pk.num_public_inputs,
            deferred_gates: pk.deferred_gates.clone(),
            num_deferred_values: pk.num_deferred_values,
            q_m,
            q_1,
            q_2,
            q_3,
            q_c,
            sigma: [s_1, s_2, s_3],
            reference_string: params.verifier_reference_string(),
        })
    }

    /// Number of public inputs declared by the circuit itself
    pub fn num_declared_public_inputs(&self) -> usize {
        self.num_public_inputs.saturating_sub(self.num_deferred_values)
    }

    /// Evaluation domain of the circuit
    pub fn domain(&self) -> Result<Domain> {
        Domain::new(self.circuit_size)
    }

    /// Labelled commitments in `q_m, q_1, q_2, q_3, q_c, sigma_1..3` order
    pub fn commitments(&self) -> [(&'static str, &GroupElement); 8] {
        [
            ("Q_M", &self.q_m),
            ("Q_1", &self.q_1),
            ("Q_2", &self.q_2),
            ("Q_3", &self.q_3),
            ("Q_C", &self.q_c),
            ("SIGMA_1", &self.sigma[0]),
            ("SIGMA_2", &self.sigma[1]),
            ("SIGMA_3", &self.sigma[2]),
        ]
    }

    /// Fail on the first commitment that is the point at infinity
    pub fn check_non_degenerate(&self) -> Result<()> {
        for (label, commitment) in self.commitments() {
            if bool::from(commitment.is_identity()) {
                return Err(PlonkError::DegenerateCommitment(format!(
                    "verification key commitment {} is the point at infinity",
                    label
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;
    use commitments::ReferenceString;
    use plonk_arith::{ArithmeticGate, Composer, ComposerVariant};

    fn key() -> VerificationKey {
        let srs = ReferenceString::insecure_from_seed(16, b"vk-tests").unwrap();
        let mut cs = Composer::new(ComposerVariant::Standard, Arc::new(srs));
        let a = cs.add_variable(Scalar::from(2u64));
        let b = cs.add_public_variable(Scalar::from(3u64));
        let c = cs.add_public_variable(Scalar::from(5u64));
        cs.create_arithmetic_gate(ArithmeticGate::addition(a, b, c));
        cs.finalize();
        let pk = ProvingKey::compute(&cs).unwrap();
        VerificationKey::from_proving_key(&pk).unwrap()
    }

    #[test]
    fn test_commitments_are_non_degenerate() {
        let vk = key();
        assert_eq!(vk.circuit_size, 8);
        assert_eq!(vk.num_public_inputs, 2);
        assert_eq!(vk.num_declared_public_inputs(), 2);
        assert!(vk.deferred_gates.is_empty());
        vk.check_non_degenerate().unwrap();
        assert_eq!(vk.domain().unwrap().size(), 8);
    }

    #[test]
    fn test_identity_commitment_detected() {
        let mut vk = key();
        vk.q_m = GroupElement::identity();
        assert!(matches!(
            vk.check_non_degenerate(),
            Err(PlonkError::DegenerateCommitment(msg)) if msg.contains("Q_M")
        ));
    }
}
