//! Native PLONK verifier
//!
//! Verification replays the transcript, checks the quotient identity at
//! `zeta`, and reduces both KZG openings to a single pair of points
//! `(P0, P1)` with
//!
//! ```text
//! P0 = zeta * PI_Z + u * zeta * omega * PI_Z_OMEGA
//!      + sum_i s_i * C_i - (sum_i nu^i * e_i + u * z_omega) * G
//! P1 = -(PI_Z + u * PI_Z_OMEGA)
//! ```
//!
//! where `C_i` are the committed polynomials in [`OPENING_LABELS`] order,
//! `s_i = nu^i` plus `u` on the permutation commitment, and `u` is the
//! separator challenge.
//!
//! Hash-round and curve gates are deferred by the proving key. Before the
//! reduction the verifier re-checks each of them on the trailing public
//! inputs, see [`deferred_gates_hold`].

use crate::manifest::Manifest;
use crate::proof::{Evaluations, Proof};
use crate::proving_key::coset_generators;
use crate::transcript::Transcript;
use crate::verification_key::VerificationKey;
use crate::{GroupElement, PlonkError, Result, Scalar};
use commitments::msm::msm;
use commitments::{pairing_check, GroupProjective, HashKind};
use ff::Field;
use group::Curve;
use plonk_arith::ComposerVariant;
use std::sync::Arc;

/// Commitments opened at `zeta`, in batching order
pub const OPENING_LABELS: [&str; 15] = [
    "W_1", "W_2", "W_3", "SIGMA_1", "SIGMA_2", "SIGMA_3", "Q_M", "Q_1", "Q_2", "Q_3", "Q_C",
    "Z_PERM", "T_LO", "T_MID", "T_HI",
];

/// Position of the permutation commitment in [`OPENING_LABELS`]
pub const Z_OPENING_INDEX: usize = 11;

/// Which verifier flavour to run; mirrors [`crate::ProverKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifierKind {
    Standard,
    Ultra,
    UltraToStandard,
}

impl VerifierKind {
    /// Fiat-Shamir hash used by the transcript
    pub fn transcript_hash(&self) -> HashKind {
        match self {
            VerifierKind::Standard | VerifierKind::UltraToStandard => HashKind::Standard,
            VerifierKind::Ultra => HashKind::Ultra,
        }
    }

    /// Composer variant of the circuits this verifier checks
    pub fn composer_variant(&self) -> ComposerVariant {
        match self {
            VerifierKind::Standard => ComposerVariant::Standard,
            VerifierKind::Ultra | VerifierKind::UltraToStandard => ComposerVariant::Ultra,
        }
    }
}

/// Fiat-Shamir challenges of one proof
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenges {
    pub beta: Scalar,
    pub gamma: Scalar,
    pub alpha: Scalar,
    pub zeta: Scalar,
    pub nu: Scalar,
    pub separator: Scalar,
}

/// Native verifier bound to a verification key
#[derive(Debug, Clone)]
pub struct Verifier {
    kind: VerifierKind,
    key: Arc<VerificationKey>,
}

impl Verifier {
    pub fn new(kind: VerifierKind, key: Arc<VerificationKey>) -> Self {
        Self { kind, key }
    }

    pub fn kind(&self) -> VerifierKind {
        self.kind
    }

    pub fn key(&self) -> &Arc<VerificationKey> {
        &self.key
    }

    /// Full verification including the pairing check
    ///
    /// Returns `Ok(false)` for a well-formed proof that does not verify and
    /// an error for a malformed one.
    #[tracing::instrument(skip_all, name = "Verifier::verify_proof", fields(kind = ?self.kind))]
    pub fn verify_proof(&self, proof: &Proof) -> Result<bool> {
        let points = match self.reduce_to_pairing_points(proof)? {
            Some(points) => points,
            None => return Ok(false),
        };
        let valid = pairing_check(&points, self.key.reference_string.precomputed_g2_lines());
        if !valid {
            tracing::debug!("pairing check failed");
        }
        Ok(valid)
    }

    /// Replay the transcript of `proof`
    pub fn compute_challenges(&self, proof: &Proof) -> Result<Challenges> {
        let vk = &self.key;
        vk.check_non_degenerate()?;
        if proof.public_inputs.len() != vk.num_public_inputs {
            return Err(PlonkError::InvalidProof(format!(
                "expected {} public inputs, proof has {}",
                vk.num_public_inputs,
                proof.public_inputs.len()
            )));
        }
        for (label, commitment) in proof.commitments() {
            if bool::from(commitment.is_identity()) {
                return Err(PlonkError::DegenerateCommitment(format!(
                    "proof commitment {} is the point at infinity",
                    label
                )));
            }
        }

        let manifest = Manifest::create(vk.num_public_inputs);
        let mut transcript = Transcript::new(&manifest, self.kind.transcript_hash());

        transcript.send_scalar("circuit_size", &Scalar::from(vk.circuit_size as u64))?;
        transcript.send_scalar(
            "public_input_count",
            &Scalar::from(vk.num_public_inputs as u64),
        )?;
        transcript.send_scalars("public_inputs", &proof.public_inputs)?;
        for (label, point) in ["W_1", "W_2", "W_3"].into_iter().zip(proof.w.iter()) {
            transcript.send_point(label, point)?;
        }
        let beta_gamma = transcript.apply_fiat_shamir("beta")?;
        let (beta, gamma) = match beta_gamma.as_slice() {
            [beta, gamma] => (*beta, *gamma),
            _ => {
                return Err(PlonkError::Transcript(
                    "round 1 must produce two challenges".to_string(),
                ))
            }
        };

        transcript.send_point("Z_PERM", &proof.z)?;
        let alpha = transcript.get_challenge("alpha")?;

        for (label, point) in ["T_LO", "T_MID", "T_HI"].into_iter().zip(proof.t.iter()) {
            transcript.send_point(label, point)?;
        }
        let zeta = transcript.get_challenge("zeta")?;

        for (label, value) in proof.evaluations.labelled() {
            transcript.send_scalar(label, &value)?;
        }
        let nu = transcript.get_challenge("nu")?;

        transcript.send_point("PI_Z", &proof.pi_z)?;
        transcript.send_point("PI_Z_OMEGA", &proof.pi_z_omega)?;
        let separator = transcript.get_challenge("separator")?;

        Ok(Challenges {
            beta,
            gamma,
            alpha,
            zeta,
            nu,
            separator,
        })
    }

    /// Reduce `proof` to pairing points, or `None` if the quotient identity
    /// does not hold
    pub fn reduce_to_pairing_points(&self, proof: &Proof) -> Result<Option<[GroupElement; 2]>> {
        let vk = &self.key;
        let challenges = self.compute_challenges(proof)?;
        let domain = vk.domain()?;

        if !quotient_identity_holds(vk, proof, &challenges)? {
            tracing::debug!("quotient identity does not hold");
            return Ok(None);
        }
        if !deferred_gates_hold(vk, proof)? {
            return Ok(None);
        }

        let Challenges {
            zeta,
            nu,
            separator: u,
            ..
        } = challenges;
        let evals = proof.evaluations.to_array();

        let commitments = opening_commitments(vk, proof);
        let mut scalars = Vec::with_capacity(commitments.len() + 3);
        let mut points = Vec::with_capacity(commitments.len() + 3);

        scalars.push(zeta);
        points.push(proof.pi_z);
        scalars.push(u * zeta * domain.generator());
        points.push(proof.pi_z_omega);

        let mut power = Scalar::ONE;
        let mut batched_value = Scalar::ZERO;
        for (i, commitment) in commitments.iter().enumerate() {
            let mut scalar = power;
            if i == Z_OPENING_INDEX {
                scalar += u;
            }
            scalars.push(scalar);
            points.push(*commitment);
            batched_value += power * evals[i];
            power *= nu;
        }
        batched_value += u * proof.evaluations.z_omega;
        scalars.push(-batched_value);
        points.push(GroupElement::generator());

        let p0 = msm(&scalars, &points)?;
        let p1 = -(GroupProjective::from(proof.pi_z) + proof.pi_z_omega * u);
        Ok(Some([p0.to_affine(), p1.to_affine()]))
    }
}

/// Commitments in [`OPENING_LABELS`] order
pub fn opening_commitments(vk: &VerificationKey, proof: &Proof) -> [GroupElement; 15] {
    [
        proof.w[0],
        proof.w[1],
        proof.w[2],
        vk.sigma[0],
        vk.sigma[1],
        vk.sigma[2],
        vk.q_m,
        vk.q_1,
        vk.q_2,
        vk.q_3,
        vk.q_c,
        proof.z,
        proof.t[0],
        proof.t[1],
        proof.t[2],
    ]
}

/// Re-check every deferred gate on the trailing public inputs of `proof`
pub fn deferred_gates_hold(vk: &VerificationKey, proof: &Proof) -> Result<bool> {
    let offset = vk
        .num_public_inputs
        .checked_sub(vk.num_deferred_values)
        .ok_or_else(|| {
            PlonkError::InvalidCircuit("more deferred values than public inputs".to_string())
        })?;
    let values = match proof.public_inputs.get(offset..) {
        Some(values) if values.len() == vk.num_deferred_values => values,
        _ => {
            return Err(PlonkError::InvalidProof(format!(
                "expected {} deferred values after {} public inputs",
                vk.num_deferred_values, offset
            )))
        }
    };

    for (i, gate) in vk.deferred_gates.iter().enumerate() {
        if let Some(wire) = gate.wires().into_iter().find(|w| *w as usize >= values.len()) {
            return Err(PlonkError::InvalidCircuit(format!(
                "deferred {} gate {} reads position {} of {}",
                gate.name(),
                i,
                wire,
                values.len()
            )));
        }
        if let Err(reason) = gate.check(|w| values[w as usize]) {
            tracing::debug!(gate = gate.name(), index = i, %reason, "deferred gate not satisfied");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Check `gate + alpha * perm + alpha^2 * (z - 1) * L_0 == t * (zeta^n - 1)`
pub fn quotient_identity_holds(
    vk: &VerificationKey,
    proof: &Proof,
    challenges: &Challenges,
) -> Result<bool> {
    let domain = vk.domain()?;
    let Challenges {
        beta,
        gamma,
        alpha,
        zeta,
        ..
    } = *challenges;
    let Evaluations {
        w_1,
        w_2,
        w_3,
        sigma_1,
        sigma_2,
        sigma_3,
        q_m,
        q_1,
        q_2,
        q_3,
        q_c,
        z,
        t_lo,
        t_mid,
        t_hi,
        z_omega,
    } = proof.evaluations;

    let vanishing = domain.evaluate_vanishing(&zeta);
    if vanishing == Scalar::ZERO {
        return Err(PlonkError::InvalidProof(
            "evaluation challenge lies in the domain".to_string(),
        ));
    }

    let mut public_input_eval = Scalar::ZERO;
    for (i, input) in proof.public_inputs.iter().enumerate() {
        public_input_eval -= *input * domain.evaluate_lagrange(i, &zeta)?;
    }

    let gate = q_m * w_1 * w_2 + q_1 * w_1 + q_2 * w_2 + q_3 * w_3 + q_c + public_input_eval;

    let k = coset_generators();
    let wires = [w_1, w_2, w_3];
    let sigmas = [sigma_1, sigma_2, sigma_3];
    let mut identity_product = z;
    let mut sigma_product = z_omega;
    for j in 0..3 {
        identity_product *= wires[j] + beta * k[j] * zeta + gamma;
        sigma_product *= wires[j] + beta * sigmas[j] + gamma;
    }
    let permutation = identity_product - sigma_product;

    let boundary = (z - Scalar::ONE) * domain.evaluate_lagrange(0, &zeta)?;

    let zeta_n = vanishing + Scalar::ONE;
    let t = t_lo + zeta_n * t_mid + zeta_n.square() * t_hi;

    let lhs = gate + alpha * permutation + alpha.square() * boundary;
    Ok(lhs == t * vanishing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_mirror_prover_kinds() {
        use crate::ProverKind;
        let pairs = [
            (ProverKind::Standard, VerifierKind::Standard),
            (ProverKind::Ultra, VerifierKind::Ultra),
            (ProverKind::UltraToStandard, VerifierKind::UltraToStandard),
        ];
        for (prover, verifier) in pairs {
            assert_eq!(prover.transcript_hash(), verifier.transcript_hash());
            assert_eq!(prover.composer_variant(), verifier.composer_variant());
        }
    }

    #[test]
    fn test_opening_order_matches_evaluations() {
        for (opening, evaluation) in OPENING_LABELS.iter().zip(crate::EVALUATION_LABELS.iter()) {
            let normalized = opening.to_lowercase().replace("_perm", "");
            assert_eq!(&normalized, evaluation);
        }
        assert_eq!(OPENING_LABELS[Z_OPENING_INDEX], "Z_PERM");
    }
}
