//! PLONK verifier expressed as outer-circuit constraints
//!
//! The outer circuit replays the inner transcript, constrains the quotient
//! identity at `zeta`, and reduces the two KZG openings to the pair
//!
//! ```text
//! P0 = zeta * PI_Z + u * zeta * omega * PI_Z_OMEGA
//!      + sum_i s_i * C_i - (sum_i nu^i * e_i + u * z_omega) * G
//! P1 = -(PI_Z + u * PI_Z_OMEGA)
//! ```
//!
//! exactly as the native verifier does. The pairing itself is deferred to
//! the caller through the returned [`AggregationState`]. Gates the inner key
//! deferred are added to the outer circuit over the exposed public inputs.

use crate::transcript::CircuitTranscript;
use crate::variants::RecursiveSettings;
use crate::{AggregationState, CircuitVerificationKey, GroupElement, RecursionError, Result, Scalar};
use ff::Field;
use plonk_arith::{ArithError, Composer, FieldVar, G1Var};
use plonk_core::verifier::{OPENING_LABELS, Z_OPENING_INDEX};
use plonk_core::{Manifest, Proof, COSET_GENERATORS};
use std::sync::Arc;

/// Challenges replayed inside the outer circuit
#[derive(Debug, Clone, Copy)]
struct CircuitChallenges {
    beta: FieldVar,
    gamma: FieldVar,
    alpha: FieldVar,
    zeta: FieldVar,
    nu: FieldVar,
    separator: FieldVar,
}

/// Proof elements as outer-circuit witnesses
#[derive(Debug, Clone)]
struct CircuitProof {
    public_inputs: Vec<FieldVar>,
    w: [G1Var; 3],
    z: G1Var,
    t: [G1Var; 3],
    evaluations: [FieldVar; 16],
    pi_z: G1Var,
    pi_z_omega: G1Var,
}

impl CircuitProof {
    fn from_witness(cs: &mut Composer, proof: &Proof) -> Result<Self> {
        let public_inputs = proof
            .public_inputs
            .iter()
            .map(|value| FieldVar::from_public_witness(cs, *value))
            .collect();
        let mut lift = |label: &str, point: &GroupElement| point_witness(cs, label, point);

        let w = [
            lift("W_1", &proof.w[0])?,
            lift("W_2", &proof.w[1])?,
            lift("W_3", &proof.w[2])?,
        ];
        let z = lift("Z_PERM", &proof.z)?;
        let t = [
            lift("T_LO", &proof.t[0])?,
            lift("T_MID", &proof.t[1])?,
            lift("T_HI", &proof.t[2])?,
        ];
        let pi_z = lift("PI_Z", &proof.pi_z)?;
        let pi_z_omega = lift("PI_Z_OMEGA", &proof.pi_z_omega)?;
        let evaluations = proof
            .evaluations
            .to_array()
            .map(|value| FieldVar::from_witness(cs, value));

        Ok(Self {
            public_inputs,
            w,
            z,
            t,
            evaluations,
            pi_z,
            pi_z_omega,
        })
    }

    /// Commitments in opening order, verification-key entries included
    fn opening_commitments(&self, key: &CircuitVerificationKey) -> [G1Var; 15] {
        [
            self.w[0],
            self.w[1],
            self.w[2],
            key.sigma[0],
            key.sigma[1],
            key.sigma[2],
            key.q_m,
            key.q_1,
            key.q_2,
            key.q_3,
            key.q_c,
            self.z,
            self.t[0],
            self.t[1],
            self.t[2],
        ]
    }
}

fn point_witness(cs: &mut Composer, label: &str, point: &GroupElement) -> Result<G1Var> {
    G1Var::from_witness(cs, point).map_err(|err| match err {
        ArithError::PointAtInfinity => RecursionError::DegenerateCommitment(format!(
            "proof commitment {} is the point at infinity",
            label
        )),
        other => RecursionError::from(other),
    })
}

/// Verify `proof` inside `cs` and fold it into an aggregation state
///
/// A proof that fails the quotient identity marks `cs` as failed; a proof
/// whose openings are wrong yields a state that fails the pairing check.
/// With `previous`, the result is `P + u^2 * previous.P` for both points.
#[tracing::instrument(
    skip_all,
    name = "recursion::verify_proof",
    fields(settings = ?settings, circuit_size = key.circuit_size)
)]
pub fn verify_proof(
    cs: &mut Composer,
    key: &Arc<CircuitVerificationKey>,
    manifest: &Manifest,
    proof: &Proof,
    settings: RecursiveSettings,
    previous: Option<&AggregationState>,
) -> Result<AggregationState> {
    settings.check_outer(cs.variant())?;
    if cs.is_finalized() {
        return Err(RecursionError::ComposerFinalized);
    }
    let num_public_inputs = key.num_public_inputs;
    if manifest.num_public_inputs() != num_public_inputs
        || proof.public_inputs.len() != num_public_inputs
    {
        return Err(RecursionError::Transcript(format!(
            "key expects {} public inputs, manifest has {}, proof has {}",
            num_public_inputs,
            manifest.num_public_inputs(),
            proof.public_inputs.len()
        )));
    }

    let gates_before = cs.num_gates();
    let witness = CircuitProof::from_witness(cs, proof)?;
    constrain_deferred_gates(cs, key, &witness)?;
    let challenges = replay_transcript(cs, key, manifest, settings, &witness)?;
    constrain_quotient_identity(cs, key, &witness, &challenges)?;
    let (mut p0, mut p1) = batch_openings(cs, key, &witness, &challenges)?;

    if let Some(previous) = previous {
        let u = challenges.separator;
        let u_squared = u.square(cs);
        let folded_p0 = previous.p0().scalar_mul(cs, &u_squared)?;
        let folded_p1 = previous.p1().scalar_mul(cs, &u_squared)?;
        p0 = p0.add(cs, &folded_p0)?;
        p1 = p1.add(cs, &folded_p1)?;
    }

    tracing::debug!(
        gates = cs.num_gates() - gates_before,
        accumulated = previous.is_some(),
        failed = cs.failed(),
        "proof verified in circuit"
    );
    let mut public_inputs = witness.public_inputs;
    public_inputs.truncate(key.num_declared_public_inputs());
    Ok(AggregationState::new(p0, p1, public_inputs))
}

fn constrain_deferred_gates(
    cs: &mut Composer,
    key: &CircuitVerificationKey,
    proof: &CircuitProof,
) -> Result<()> {
    let exposed = &proof.public_inputs[key.num_declared_public_inputs()..];
    if exposed.len() != key.num_deferred_values {
        return Err(RecursionError::Transcript(format!(
            "key defers {} values, proof exposes {}",
            key.num_deferred_values,
            exposed.len()
        )));
    }
    let wires: Vec<u32> = exposed.iter().map(|value| value.normalize(cs)).collect();
    for gate in &key.deferred_gates {
        if let Some(position) = gate.wires().into_iter().find(|p| *p as usize >= wires.len()) {
            return Err(RecursionError::Transcript(format!(
                "deferred {} gate reads position {} of {}",
                gate.name(),
                position,
                wires.len()
            )));
        }
        cs.create_gate(gate.map_wires(|position| wires[position as usize]));
    }
    Ok(())
}

fn replay_transcript(
    cs: &mut Composer,
    key: &CircuitVerificationKey,
    manifest: &Manifest,
    settings: RecursiveSettings,
    proof: &CircuitProof,
) -> Result<CircuitChallenges> {
    let mut transcript = CircuitTranscript::new(cs, manifest, settings.transcript_hash())?;

    let circuit_size = FieldVar::constant(Scalar::from(key.circuit_size as u64));
    let input_count = FieldVar::constant(Scalar::from(key.num_public_inputs as u64));
    transcript.send_scalar(cs, "circuit_size", &circuit_size)?;
    transcript.send_scalar(cs, "public_input_count", &input_count)?;
    transcript.send_scalars(cs, "public_inputs", &proof.public_inputs)?;
    for (label, point) in ["W_1", "W_2", "W_3"].into_iter().zip(proof.w.iter()) {
        transcript.send_point(cs, label, point)?;
    }
    let (beta, gamma) = match transcript.apply_fiat_shamir(cs, "beta")?.as_slice() {
        [beta, gamma] => (*beta, *gamma),
        _ => {
            return Err(RecursionError::Transcript(
                "round 1 must produce two challenges".to_string(),
            ))
        }
    };

    transcript.send_point(cs, "Z_PERM", &proof.z)?;
    let alpha = transcript.get_challenge(cs, "alpha")?;

    for (label, point) in ["T_LO", "T_MID", "T_HI"].into_iter().zip(proof.t.iter()) {
        transcript.send_point(cs, label, point)?;
    }
    let zeta = transcript.get_challenge(cs, "zeta")?;

    for (label, value) in plonk_core::EVALUATION_LABELS
        .into_iter()
        .zip(proof.evaluations.iter())
    {
        transcript.send_scalar(cs, label, value)?;
    }
    let nu = transcript.get_challenge(cs, "nu")?;

    transcript.send_point(cs, "PI_Z", &proof.pi_z)?;
    transcript.send_point(cs, "PI_Z_OMEGA", &proof.pi_z_omega)?;
    let separator = transcript.get_challenge(cs, "separator")?;

    if !transcript.is_complete() {
        return Err(RecursionError::Transcript(
            "manifest has rounds left after the separator".to_string(),
        ));
    }

    Ok(CircuitChallenges {
        beta,
        gamma,
        alpha,
        zeta,
        nu,
        separator,
    })
}

/// `L_i(zeta) = omega^i (zeta^n - 1) / (n (zeta - omega^i))`
fn lagrange(
    cs: &mut Composer,
    key: &CircuitVerificationKey,
    i: usize,
    zeta: &FieldVar,
    vanishing: &FieldVar,
) -> Result<FieldVar> {
    let omega_i = key.domain.element(i);
    let numerator = vanishing.mul_constant(cs, omega_i);
    let denominator = zeta
        .add_constant(cs, -omega_i)
        .mul_constant(cs, Scalar::from(key.circuit_size as u64));
    Ok(numerator.div(cs, &denominator)?)
}

/// Constrain `gate + alpha * perm + alpha^2 * (z - 1) * L_0 == t * (zeta^n - 1)`
fn constrain_quotient_identity(
    cs: &mut Composer,
    key: &CircuitVerificationKey,
    proof: &CircuitProof,
    challenges: &CircuitChallenges,
) -> Result<()> {
    let CircuitChallenges {
        beta,
        gamma,
        alpha,
        zeta,
        ..
    } = *challenges;
    let [w_1, w_2, w_3, sigma_1, sigma_2, sigma_3, q_m, q_1, q_2, q_3, q_c, z, t_lo, t_mid, t_hi, z_omega] =
        proof.evaluations;

    let zeta_n = zeta.pow2k(cs, key.domain.log_size());
    let vanishing = zeta_n.add_constant(cs, -Scalar::ONE);
    if vanishing.value() == Scalar::ZERO {
        return Err(RecursionError::Transcript(
            "evaluation challenge lies in the domain".to_string(),
        ));
    }

    let mut public_input_eval = FieldVar::constant(Scalar::ZERO);
    for (i, input) in proof.public_inputs.iter().enumerate() {
        let l_i = lagrange(cs, key, i, &zeta, &vanishing)?;
        let term = input.mul(cs, &l_i);
        public_input_eval = public_input_eval.sub(cs, &term);
    }

    // q_m * w_1 * w_2 + q_1 * w_1 + q_2 * w_2 + q_3 * w_3 + q_c + PI(zeta)
    let w_12 = w_1.mul(cs, &w_2);
    let mut gate = q_m.mul(cs, &w_12);
    gate = q_1.madd(cs, &w_1, &gate);
    gate = q_2.madd(cs, &w_2, &gate);
    gate = q_3.madd(cs, &w_3, &gate);
    gate = gate.add(cs, &q_c);
    gate = gate.add(cs, &public_input_eval);

    let beta_zeta = beta.mul(cs, &zeta);
    let wires = [w_1, w_2, w_3];
    let sigmas = [sigma_1, sigma_2, sigma_3];
    let mut identity_product = z;
    let mut sigma_product = z_omega;
    for j in 0..3 {
        let shifted = beta_zeta.mul_constant(cs, Scalar::from(COSET_GENERATORS[j]));
        let identity_term = wires[j].add(cs, &shifted).add(cs, &gamma);
        identity_product = identity_product.mul(cs, &identity_term);

        let sigma_term = beta.madd(cs, &sigmas[j], &wires[j]).add(cs, &gamma);
        sigma_product = sigma_product.mul(cs, &sigma_term);
    }
    let permutation = identity_product.sub(cs, &sigma_product);

    let l_0 = lagrange(cs, key, 0, &zeta, &vanishing)?;
    let boundary = z.add_constant(cs, -Scalar::ONE).mul(cs, &l_0);

    let alpha_squared = alpha.square(cs);
    let lhs = alpha.madd(cs, &permutation, &gate);
    let lhs = alpha_squared.madd(cs, &boundary, &lhs);

    let zeta_2n = zeta_n.square(cs);
    let t = zeta_n.madd(cs, &t_mid, &t_lo);
    let t = zeta_2n.madd(cs, &t_hi, &t);
    let rhs = t.mul(cs, &vanishing);

    lhs.assert_equal(cs, &rhs, "quotient identity");
    Ok(())
}

/// Reduce both openings to `(P0, P1)`
fn batch_openings(
    cs: &mut Composer,
    key: &CircuitVerificationKey,
    proof: &CircuitProof,
    challenges: &CircuitChallenges,
) -> Result<(G1Var, G1Var)> {
    let CircuitChallenges {
        zeta,
        nu,
        separator: u,
        ..
    } = *challenges;
    let commitments = proof.opening_commitments(key);
    debug_assert_eq!(commitments.len(), OPENING_LABELS.len());

    let mut points = Vec::with_capacity(commitments.len() + 3);
    let mut scalars = Vec::with_capacity(commitments.len() + 3);

    points.push(proof.pi_z);
    scalars.push(zeta);
    points.push(proof.pi_z_omega);
    let u_zeta = u.mul(cs, &zeta);
    scalars.push(u_zeta.mul_constant(cs, key.domain.generator()));

    let mut power = FieldVar::constant(Scalar::ONE);
    let mut batched_value = FieldVar::constant(Scalar::ZERO);
    for (i, commitment) in commitments.iter().enumerate() {
        let scalar = if i == Z_OPENING_INDEX {
            power.add(cs, &u)
        } else {
            power
        };
        points.push(*commitment);
        scalars.push(scalar);
        batched_value = power.madd(cs, &proof.evaluations[i], &batched_value);
        power = power.mul(cs, &nu);
    }
    batched_value = u.madd(cs, &proof.evaluations[15], &batched_value);
    points.push(G1Var::constant(&GroupElement::generator())?);
    scalars.push(batched_value.neg(cs));

    let p0 = G1Var::msm(cs, &points, &scalars)?;
    let shifted = proof.pi_z_omega.scalar_mul(cs, &u)?;
    let p1 = proof.pi_z.add(cs, &shifted)?.neg(cs)?;
    Ok((p0, p1))
}
