//! Verification key lifted into the outer circuit
//!
//! Commitments become point witnesses of the outer circuit, each constrained
//! to lie on the curve. The circuit size, the public-input count and the
//! domain generator are fixed when the outer circuit is built and stay
//! constants, as do the deferred gates, which the outer circuit re-creates
//! over the proof's exposed public inputs.

use crate::{GroupElement, RecursionError, Result, Scalar};
use commitments::{g1_to_limbs, VerifierReferenceString};
use plonk_arith::{Composer, FieldVar, G1Var, Gate};
use plonk_core::{Domain, PlonkError, VerificationKey};
use std::sync::Arc;

/// In-circuit verification key
#[derive(Debug, Clone)]
pub struct CircuitVerificationKey {
    pub circuit_size: usize,
    pub num_public_inputs: usize,
    pub domain: Domain,
    pub q_m: G1Var,
    pub q_1: G1Var,
    pub q_2: G1Var,
    pub q_3: G1Var,
    pub q_c: G1Var,
    pub sigma: [G1Var; 3],
    /// Gates checked on the last `num_deferred_values` public inputs
    pub deferred_gates: Vec<Gate>,
    pub num_deferred_values: usize,
    reference_string: Arc<VerifierReferenceString>,
}

impl CircuitVerificationKey {
    /// Lift `key` into `composer` as witnesses
    pub fn from_witness(composer: &mut Composer, key: &VerificationKey) -> Result<Arc<Self>> {
        if composer.is_finalized() {
            return Err(RecursionError::ComposerFinalized);
        }
        key.check_non_degenerate().map_err(|err| match err {
            PlonkError::DegenerateCommitment(msg) => RecursionError::DegenerateCommitment(msg),
            other => RecursionError::Plonk(other),
        })?;

        let domain = key.domain()?;
        let mut lift = |point: &GroupElement| G1Var::from_witness(composer, point);
        let lifted = Self {
            circuit_size: key.circuit_size,
            num_public_inputs: key.num_public_inputs,
            domain,
            q_m: lift(&key.q_m)?,
            q_1: lift(&key.q_1)?,
            q_2: lift(&key.q_2)?,
            q_3: lift(&key.q_3)?,
            q_c: lift(&key.q_c)?,
            sigma: [lift(&key.sigma[0])?, lift(&key.sigma[1])?, lift(&key.sigma[2])?],
            deferred_gates: key.deferred_gates.clone(),
            num_deferred_values: key.num_deferred_values,
            reference_string: key.reference_string.clone(),
        };

        tracing::debug!(
            circuit_size = lifted.circuit_size,
            num_public_inputs = lifted.num_public_inputs,
            deferred_gates = lifted.deferred_gates.len(),
            q_m = %hex::encode(key.q_m.to_compressed()),
            "verification key lifted"
        );
        Ok(Arc::new(lifted))
    }

    /// Verifier half of the reference string the key was computed with
    pub fn reference_string(&self) -> &Arc<VerifierReferenceString> {
        &self.reference_string
    }

    /// Public inputs the inner circuit declared, before the exposed values
    pub fn num_declared_public_inputs(&self) -> usize {
        self.num_public_inputs.saturating_sub(self.num_deferred_values)
    }

    /// Domain generator as a circuit constant
    pub fn generator(&self) -> FieldVar {
        FieldVar::constant(self.domain.generator())
    }

    /// Commitments in `q_m, q_1, q_2, q_3, q_c, sigma_1..3` order
    pub fn commitments(&self) -> [&G1Var; 8] {
        [
            &self.q_m,
            &self.q_1,
            &self.q_2,
            &self.q_3,
            &self.q_c,
            &self.sigma[0],
            &self.sigma[1],
            &self.sigma[2],
        ]
    }

    /// Limb values of every commitment, in [`Self::commitments`] order
    pub fn limb_values(&self) -> Vec<Scalar> {
        self.commitments()
            .iter()
            .flat_map(|point| point.limbs().map(|limb| limb.value()))
            .collect()
    }

    /// Whether the limb witnesses match the native key
    pub fn matches(&self, key: &VerificationKey) -> bool {
        let native = [
            key.q_m, key.q_1, key.q_2, key.q_3, key.q_c, key.sigma[0], key.sigma[1], key.sigma[2],
        ];
        native.iter().zip(self.commitments()).all(|(point, lifted)| {
            g1_to_limbs(point)
                .map(|limbs| limbs == lifted.limbs().map(|limb| limb.value()))
                .unwrap_or(false)
        }) && key.circuit_size == self.circuit_size
            && key.num_public_inputs == self.num_public_inputs
            && key.num_deferred_values == self.num_deferred_values
            && key.deferred_gates == self.deferred_gates
    }
}
