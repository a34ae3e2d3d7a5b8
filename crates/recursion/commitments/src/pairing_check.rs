//! The final pairing check over an accumulated pair of G1 points
//!
//! Every KZG opening, and every accumulation of openings, reduces to two points
//! `(P0, P1)` such that `e(P0, [1]_2) * e(P1, [tau]_2) == 1`.

use crate::{GroupElement, GroupProjective, PrecomputedG2Lines, Scalar};
use bls12_381::{Bls12, Gt};
use group::Curve;
use pairing::MultiMillerLoop;

/// Check `e(P0, [1]_2) * e(P1, [tau]_2) == 1`
pub fn pairing_check(points: &[GroupElement; 2], lines: &PrecomputedG2Lines) -> bool {
    let result = Bls12::multi_miller_loop(&[(&points[0], &lines.one), (&points[1], &lines.tau)])
        .final_exponentiation();
    result == Gt::identity()
}

/// Reduce the claim `p(z) = value`, witnessed by `witness = [q(tau)]_1`, to
/// a pairing-point pair
///
/// `P0 = C - value * G + z * W` and `P1 = -W`.
pub fn reduce_opening(
    commitment: &GroupElement,
    point: &Scalar,
    value: &Scalar,
    witness: &GroupElement,
) -> [GroupElement; 2] {
    let p0 = GroupProjective::from(commitment) - GroupProjective::generator() * value
        + GroupProjective::from(witness) * point;
    let p1 = -GroupProjective::from(witness);
    [p0.to_affine(), p1.to_affine()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceString;

    #[test]
    fn test_trivial_pair_passes() {
        let srs = ReferenceString::insecure_from_seed(2, b"pairing").unwrap();
        let vrs = srs.verifier_reference_string();
        let identity = [GroupElement::identity(), GroupElement::identity()];
        assert!(pairing_check(&identity, vrs.precomputed_g2_lines()));
    }

    #[test]
    fn test_tau_relation() {
        let srs = ReferenceString::insecure_from_seed(2, b"pairing").unwrap();
        let vrs = srs.verifier_reference_string();
        let powers = srs.g1_powers(2).unwrap();

        // e([tau]_1, [1]_2) * e(-[1]_1, [tau]_2) == 1
        let good = [powers[1], -powers[0]];
        assert!(pairing_check(&good, vrs.precomputed_g2_lines()));

        let bad = [powers[1], powers[0]];
        assert!(!pairing_check(&bad, vrs.precomputed_g2_lines()));
    }

    #[test]
    fn test_reduce_opening_of_identity_polynomial() {
        // p(X) = X opens to z with quotient q(X) = 1
        let srs = ReferenceString::insecure_from_seed(2, b"pairing").unwrap();
        let vrs = srs.verifier_reference_string();
        let powers = srs.g1_powers(2).unwrap();

        let z = Scalar::from(11u64);
        let points = reduce_opening(&powers[1], &z, &z, &powers[0]);
        assert!(pairing_check(&points, vrs.precomputed_g2_lines()));

        let wrong = reduce_opening(&powers[1], &z, &Scalar::from(12u64), &powers[0]);
        assert!(!pairing_check(&wrong, vrs.precomputed_g2_lines()));
    }
}
