//! PLONK prover
//!
//! Proofs are deterministic: there is no blinding, so two provers over the
//! same key and witness produce identical proofs.

use crate::manifest::Manifest;
use crate::polynomial::DensePolynomial;
use crate::proof::{Evaluations, Proof};
use crate::proving_key::{coset_generators, ProvingKey, Witness};
use crate::transcript::Transcript;
use crate::{GroupElement, PlonkError, Result, Scalar};
use commitments::{CommitmentEngine, HashKind, KzgCommitmentEngine, ReferenceString};
use ff::Field;
use plonk_arith::ComposerVariant;
use rayon::prelude::*;
use std::sync::Arc;

/// Which prover flavour to run
///
/// `UltraToStandard` proves an Ultra circuit with the standard transcript
/// hash, so that a Standard circuit can verify the proof recursively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProverKind {
    Standard,
    Ultra,
    UltraToStandard,
}

impl ProverKind {
    /// Fiat-Shamir hash used by the transcript
    pub fn transcript_hash(&self) -> HashKind {
        match self {
            ProverKind::Standard | ProverKind::UltraToStandard => HashKind::Standard,
            ProverKind::Ultra => HashKind::Ultra,
        }
    }

    /// Composer variant the prover accepts
    pub fn composer_variant(&self) -> ComposerVariant {
        match self {
            ProverKind::Standard => ComposerVariant::Standard,
            ProverKind::Ultra | ProverKind::UltraToStandard => ComposerVariant::Ultra,
        }
    }
}

/// Prover bound to a proving key and a witness
#[derive(Debug, Clone)]
pub struct Prover {
    kind: ProverKind,
    key: Arc<ProvingKey>,
    witness: Witness,
}

impl Prover {
    pub fn new(kind: ProverKind, key: Arc<ProvingKey>, witness: Witness) -> Self {
        Self { kind, key, witness }
    }

    pub fn kind(&self) -> ProverKind {
        self.kind
    }

    pub fn key(&self) -> &Arc<ProvingKey> {
        &self.key
    }

    /// Run the five prover rounds
    #[tracing::instrument(skip_all, name = "Prover::construct_proof", fields(kind = ?self.kind, n = self.key.circuit_size))]
    pub fn construct_proof(&self) -> Result<Proof> {
        let pk = &self.key;
        let witness = &self.witness;
        let n = pk.circuit_size;
        let params = &pk.reference_string;

        if witness.public_inputs.len() != pk.num_public_inputs {
            return Err(PlonkError::ProofGenerationFailed(format!(
                "expected {} public inputs, witness has {}",
                pk.num_public_inputs,
                witness.public_inputs.len()
            )));
        }

        let manifest = Manifest::create(pk.num_public_inputs);
        let mut transcript = Transcript::new(&manifest, self.kind.transcript_hash());

        // Round 1: wires
        let w = [
            DensePolynomial::from_evaluations(&pk.domain, &witness.wires[0])?,
            DensePolynomial::from_evaluations(&pk.domain, &witness.wires[1])?,
            DensePolynomial::from_evaluations(&pk.domain, &witness.wires[2])?,
        ];
        let w_commitments = commit_all(params, &[&w[0], &w[1], &w[2]])?;
        let w_commitments: [GroupElement; 3] = to_array(w_commitments)?;

        transcript.send_scalar("circuit_size", &Scalar::from(n as u64))?;
        transcript.send_scalar(
            "public_input_count",
            &Scalar::from(pk.num_public_inputs as u64),
        )?;
        transcript.send_scalars("public_inputs", &witness.public_inputs)?;
        for (label, commitment) in ["W_1", "W_2", "W_3"].into_iter().zip(w_commitments.iter()) {
            transcript.send_point(label, commitment)?;
        }
        let [beta, gamma]: [Scalar; 2] = to_array(transcript.apply_fiat_shamir("beta")?)?;
        tracing::debug!(w_1 = %hex::encode(w_commitments[0].to_compressed()), "round 1");

        // Round 2: permutation grand product
        let z_evals = self.grand_product(&beta, &gamma)?;
        let z = DensePolynomial::from_evaluations(&pk.domain, &z_evals)?;
        let z_commitment = KzgCommitmentEngine::commit(params, z.coeffs())?;
        transcript.send_point("Z_PERM", &z_commitment)?;
        let alpha = transcript.get_challenge("alpha")?;

        // Round 3: quotient
        let t = self.quotient(&w, &z, &beta, &gamma, &alpha)?;
        let t_chunks = split_quotient(&t, n)?;
        let t_commitments: [GroupElement; 3] =
            to_array(commit_all(params, &[&t_chunks[0], &t_chunks[1], &t_chunks[2]])?)?;
        for (label, commitment) in ["T_LO", "T_MID", "T_HI"]
            .into_iter()
            .zip(t_commitments.iter())
        {
            transcript.send_point(label, commitment)?;
        }
        let zeta = transcript.get_challenge("zeta")?;

        // Round 4: evaluations
        let zeta_omega = zeta * pk.domain.generator();
        let evaluations = Evaluations {
            w_1: w[0].evaluate(&zeta),
            w_2: w[1].evaluate(&zeta),
            w_3: w[2].evaluate(&zeta),
            sigma_1: pk.sigma[0].evaluate(&zeta),
            sigma_2: pk.sigma[1].evaluate(&zeta),
            sigma_3: pk.sigma[2].evaluate(&zeta),
            q_m: pk.q_m.evaluate(&zeta),
            q_1: pk.q_1.evaluate(&zeta),
            q_2: pk.q_2.evaluate(&zeta),
            q_3: pk.q_3.evaluate(&zeta),
            q_c: pk.q_c.evaluate(&zeta),
            z: z.evaluate(&zeta),
            t_lo: t_chunks[0].evaluate(&zeta),
            t_mid: t_chunks[1].evaluate(&zeta),
            t_hi: t_chunks[2].evaluate(&zeta),
            z_omega: z.evaluate(&zeta_omega),
        };
        for (label, value) in evaluations.labelled() {
            transcript.send_scalar(label, &value)?;
        }
        let nu = transcript.get_challenge("nu")?;

        // Round 5: batched openings
        let opened = [
            &w[0],
            &w[1],
            &w[2],
            &pk.sigma[0],
            &pk.sigma[1],
            &pk.sigma[2],
            &pk.q_m,
            &pk.q_1,
            &pk.q_2,
            &pk.q_3,
            &pk.q_c,
            &z,
            &t_chunks[0],
            &t_chunks[1],
            &t_chunks[2],
        ];
        let mut batched = DensePolynomial::zero();
        let mut power = Scalar::ONE;
        for polynomial in opened {
            batched = batched.add(&polynomial.scale(&power));
            power *= nu;
        }
        let (_, pi_z) = KzgCommitmentEngine::open(params, batched.coeffs(), zeta)?;
        let (_, pi_z_omega) = KzgCommitmentEngine::open(params, z.coeffs(), zeta_omega)?;
        transcript.send_point("PI_Z", &pi_z)?;
        transcript.send_point("PI_Z_OMEGA", &pi_z_omega)?;
        transcript.get_challenge("separator")?;

        tracing::info!(
            public_inputs = witness.public_inputs.len(),
            pi_z = %hex::encode(pi_z.to_compressed()),
            "proof constructed"
        );

        Ok(Proof {
            public_inputs: witness.public_inputs.clone(),
            w: w_commitments,
            z: z_commitment,
            t: t_commitments,
            evaluations,
            pi_z,
            pi_z_omega,
        })
    }

    /// `z(omega^0) = 1`, `z(omega^(i+1)) = z(omega^i) * f_i / g_i`
    fn grand_product(&self, beta: &Scalar, gamma: &Scalar) -> Result<Vec<Scalar>> {
        let pk = &self.key;
        let wires = &self.witness.wires;
        let n = pk.circuit_size;
        let elements = pk.domain.elements();
        let k = coset_generators();

        let mut z = Vec::with_capacity(n);
        let mut acc = Scalar::ONE;
        for i in 0..n {
            z.push(acc);
            let mut numerator = Scalar::ONE;
            let mut denominator = Scalar::ONE;
            for j in 0..3 {
                numerator *= wires[j][i] + *beta * k[j] * elements[i] + gamma;
                denominator *= wires[j][i] + *beta * pk.sigma_evals[j][i] + gamma;
            }
            let inverse: Option<Scalar> = denominator.invert().into();
            let inverse = inverse.ok_or_else(|| {
                PlonkError::ProofGenerationFailed("zero grand-product denominator".to_string())
            })?;
            acc *= numerator * inverse;
        }

        if acc != Scalar::ONE {
            return Err(PlonkError::ProofGenerationFailed(
                "copy constraints are not satisfied".to_string(),
            ));
        }
        Ok(z)
    }

    /// `t = (gate + alpha * perm + alpha^2 * (z - 1) * L_0) / (X^n - 1)`
    fn quotient(
        &self,
        w: &[DensePolynomial; 3],
        z: &DensePolynomial,
        beta: &Scalar,
        gamma: &Scalar,
        alpha: &Scalar,
    ) -> Result<DensePolynomial> {
        let pk = &self.key;
        let n = pk.circuit_size;
        let domain = &pk.domain;

        let mut pi_evals = vec![Scalar::ZERO; n];
        for (eval, input) in pi_evals.iter_mut().zip(self.witness.public_inputs.iter()) {
            *eval = -*input;
        }
        let pi = DensePolynomial::from_evaluations(domain, &pi_evals)?;

        let gate = pk
            .q_m
            .mul(&w[0])?
            .mul(&w[1])?
            .add(&pk.q_1.mul(&w[0])?)
            .add(&pk.q_2.mul(&w[1])?)
            .add(&pk.q_3.mul(&w[2])?)
            .add(&pk.q_c)
            .add(&pi);

        let k = coset_generators();
        let gamma_poly = DensePolynomial::constant(*gamma);
        let mut lhs = z.clone();
        let mut rhs = z.scale_argument(&domain.generator());
        for j in 0..3 {
            let identity = DensePolynomial::from_coefficients(vec![*gamma, *beta * k[j]]);
            lhs = lhs.mul(&w[j].add(&identity))?;
            let permuted = w[j].add(&pk.sigma[j].scale(beta)).add(&gamma_poly);
            rhs = rhs.mul(&permuted)?;
        }
        let permutation = lhs.sub(&rhs);

        let mut l0_evals = vec![Scalar::ZERO; n];
        l0_evals[0] = Scalar::ONE;
        let l0 = DensePolynomial::from_evaluations(domain, &l0_evals)?;
        let boundary = z.sub(&DensePolynomial::constant(Scalar::ONE)).mul(&l0)?;

        let numerator = gate
            .add(&permutation.scale(alpha))
            .add(&boundary.scale(&alpha.square()));
        let t = numerator
            .trim()
            .divide_by_vanishing(n)
            .map_err(|_| {
                PlonkError::ProofGenerationFailed(
                    "quotient is not a polynomial: constraints are not satisfied".to_string(),
                )
            })?
            .trim();
        Ok(t)
    }
}

/// Split `t` into `t_lo + X^n t_mid + X^2n t_hi`
///
/// Fails if `t` has more than `3n` coefficients, which happens when the
/// gate identity has a higher degree than the key accounts for.
fn split_quotient(t: &DensePolynomial, n: usize) -> Result<[DensePolynomial; 3]> {
    if t.len() > 3 * n {
        return Err(PlonkError::ProofGenerationFailed(format!(
            "quotient has {} coefficients, expected at most {}",
            t.len(),
            3 * n
        )));
    }
    let mut coeffs = t.coeffs().to_vec();
    coeffs.resize(3 * n, Scalar::ZERO);
    Ok([
        DensePolynomial::from_coefficients(coeffs[..n].to_vec()),
        DensePolynomial::from_coefficients(coeffs[n..2 * n].to_vec()),
        DensePolynomial::from_coefficients(coeffs[2 * n..].to_vec()),
    ])
}

fn commit_all(
    params: &Arc<ReferenceString>,
    polynomials: &[&DensePolynomial],
) -> Result<Vec<GroupElement>> {
    Ok(polynomials
        .par_iter()
        .map(|p| KzgCommitmentEngine::commit(params, p.coeffs()))
        .collect::<commitments::Result<Vec<_>>>()?)
}

fn to_array<T, const N: usize>(values: Vec<T>) -> Result<[T; N]> {
    let len = values.len();
    values.try_into().map_err(|_| {
        PlonkError::ProofGenerationFailed(format!("expected {} values, got {}", N, len))
    })
}
