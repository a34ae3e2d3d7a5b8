//! Polynomial commitment engine trait and its KZG instantiation
//!
//! The [`CommitmentEngine`] trait abstracts over commitment schemes so the
//! PLONK prover only needs `commit` and `open`. [`KzgCommitmentEngine`] is the
//! pairing-based scheme whose openings reduce to the two-point pairing check
//! that recursive aggregation accumulates.

use crate::msm::msm;
use crate::pairing_check::{pairing_check, reduce_opening};
use crate::{CommitmentError, GroupElement, ReferenceString, Result, Scalar};
use ff::Field;
use group::Curve;
use rand_core::RngCore;
use std::sync::Arc;

/// Core trait for polynomial commitment schemes
pub trait CommitmentEngine: Clone + Send + Sync {
    /// The type of commitments produced by this engine
    type Commitment: Clone + Send + Sync;

    /// The type of opening proofs produced by this engine
    type Opening: Clone + Send + Sync;

    /// Parameters needed for the commitment scheme
    type Params: Clone + Send + Sync;

    /// Setup the commitment scheme for polynomials with up to `size` coefficients
    fn setup(size: usize, rng: &mut impl RngCore) -> Result<Self::Params>;

    /// Commit to a polynomial represented by its coefficients
    fn commit(params: &Self::Params, coefficients: &[Scalar]) -> Result<Self::Commitment>;

    /// Evaluate a polynomial at `point` and prove the evaluation
    fn open(
        params: &Self::Params,
        coefficients: &[Scalar],
        point: Scalar,
    ) -> Result<(Scalar, Self::Opening)>;

    /// Verify an opening proof
    fn verify(
        params: &Self::Params,
        commitment: &Self::Commitment,
        point: Scalar,
        evaluation: Scalar,
        opening: &Self::Opening,
    ) -> Result<bool>;

    /// Verify several opening proofs, stopping at the first failure
    fn batch_verify(
        params: &Self::Params,
        commitments: &[Self::Commitment],
        points: &[Scalar],
        evaluations: &[Scalar],
        openings: &[Self::Opening],
    ) -> Result<bool> {
        if commitments.len() != points.len()
            || points.len() != evaluations.len()
            || evaluations.len() != openings.len()
        {
            return Err(CommitmentError::InvalidParameters(
                "batch verification inputs differ in length".to_string(),
            ));
        }

        for (((commitment, &point), &evaluation), opening) in commitments
            .iter()
            .zip(points.iter())
            .zip(evaluations.iter())
            .zip(openings.iter())
        {
            if !Self::verify(params, commitment, point, evaluation, opening)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// KZG commitments over BLS12-381
#[derive(Clone, Debug)]
pub struct KzgCommitmentEngine;

impl KzgCommitmentEngine {
    /// Divide `p(X) - p(z)` by `X - z`, returning `(p(z), quotient)`
    pub fn divide_by_linear(coefficients: &[Scalar], point: &Scalar) -> (Scalar, Vec<Scalar>) {
        let n = coefficients.len();
        if n == 0 {
            return (Scalar::ZERO, Vec::new());
        }

        let mut quotient = vec![Scalar::ZERO; n - 1];
        let mut carry = coefficients[n - 1];
        for i in (0..n - 1).rev() {
            quotient[i] = carry;
            carry = coefficients[i] + carry * point;
        }
        (carry, quotient)
    }
}

impl CommitmentEngine for KzgCommitmentEngine {
    type Commitment = GroupElement;
    type Opening = GroupElement;
    type Params = Arc<ReferenceString>;

    fn setup(size: usize, rng: &mut impl RngCore) -> Result<Self::Params> {
        Ok(Arc::new(ReferenceString::generate(size, rng)?))
    }

    fn commit(params: &Self::Params, coefficients: &[Scalar]) -> Result<Self::Commitment> {
        let powers = params.g1_powers(coefficients.len())?;
        Ok(msm(coefficients, powers)?.to_affine())
    }

    fn open(
        params: &Self::Params,
        coefficients: &[Scalar],
        point: Scalar,
    ) -> Result<(Scalar, Self::Opening)> {
        let (evaluation, quotient) = Self::divide_by_linear(coefficients, &point);
        let witness = Self::commit(params, &quotient)?;
        Ok((evaluation, witness))
    }

    fn verify(
        params: &Self::Params,
        commitment: &Self::Commitment,
        point: Scalar,
        evaluation: Scalar,
        opening: &Self::Opening,
    ) -> Result<bool> {
        let points = reduce_opening(commitment, &point, &evaluation, opening);
        let verifier = params.verifier_reference_string();
        Ok(pairing_check(&points, verifier.precomputed_g2_lines()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::thread_rng;

    fn params(size: usize) -> Arc<ReferenceString> {
        Arc::new(ReferenceString::insecure_from_seed(size, b"kzg-tests").unwrap())
    }

    fn evaluate(coefficients: &[Scalar], point: &Scalar) -> Scalar {
        coefficients
            .iter()
            .rev()
            .fold(Scalar::ZERO, |acc, c| acc * point + c)
    }

    #[test]
    fn test_divide_by_linear() {
        // (X^2 + 3X + 2) = (X + 1)(X + 2), divide by (X - 5)
        let coefficients = vec![Scalar::from(2u64), Scalar::from(3u64), Scalar::ONE];
        let z = Scalar::from(5u64);
        let (value, quotient) = KzgCommitmentEngine::divide_by_linear(&coefficients, &z);
        assert_eq!(value, Scalar::from(42u64));
        assert_eq!(quotient, vec![Scalar::from(8u64), Scalar::ONE]);
    }

    #[test]
    fn test_commit_open_verify() {
        let params = params(16);
        let mut rng = thread_rng();
        let coefficients: Vec<Scalar> = (0..10).map(|_| Scalar::random(&mut rng)).collect();
        let commitment = KzgCommitmentEngine::commit(&params, &coefficients).unwrap();

        let z = Scalar::random(&mut rng);
        let (value, opening) = KzgCommitmentEngine::open(&params, &coefficients, z).unwrap();
        assert_eq!(value, evaluate(&coefficients, &z));
        assert!(KzgCommitmentEngine::verify(&params, &commitment, z, value, &opening).unwrap());
        assert!(
            !KzgCommitmentEngine::verify(&params, &commitment, z, value + Scalar::ONE, &opening)
                .unwrap()
        );
    }

    #[test]
    fn test_commit_too_large() {
        let params = params(4);
        let coefficients = vec![Scalar::ONE; 5];
        assert!(matches!(
            KzgCommitmentEngine::commit(&params, &coefficients),
            Err(CommitmentError::ReferenceStringTooSmall { required: 5, available: 4 })
        ));
    }

    #[test]
    fn test_batch_verify_length_mismatch() {
        let params = params(4);
        let result = KzgCommitmentEngine::batch_verify(&params, &[], &[Scalar::ONE], &[], &[]);
        assert!(result.is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_quotient_reconstructs_polynomial(
            raw in proptest::collection::vec(any::<u64>(), 1..12),
            z in any::<u64>(),
        ) {
            let coefficients: Vec<Scalar> = raw.iter().map(|c| Scalar::from(*c)).collect();
            let z = Scalar::from(z);
            let (value, quotient) = KzgCommitmentEngine::divide_by_linear(&coefficients, &z);

            // p(X) == q(X) * (X - z) + p(z) at an unrelated point
            let x = Scalar::from(987_654_321u64);
            prop_assert_eq!(
                evaluate(&coefficients, &x),
                evaluate(&quotient, &x) * (x - z) + value
            );
        }
    }
}
