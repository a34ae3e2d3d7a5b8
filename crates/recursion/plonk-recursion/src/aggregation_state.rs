//! Aggregation state: a deferred pairing check

use crate::{GroupElement, Result};
use commitments::{pairing_check, PrecomputedG2Lines};
use plonk_arith::{Composer, FieldVar, G1Var};

/// Points `(P0, P1)` with `e(P0, [1]_2) * e(P1, [tau]_2) == 1` iff every
/// proof folded into them is valid, plus the verified proof's public inputs
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationState {
    p0: G1Var,
    p1: G1Var,
    public_inputs: Vec<FieldVar>,
}

impl AggregationState {
    pub fn new(p0: G1Var, p1: G1Var, public_inputs: Vec<FieldVar>) -> Self {
        Self {
            p0,
            p1,
            public_inputs,
        }
    }

    pub fn p0(&self) -> &G1Var {
        &self.p0
    }

    pub fn p1(&self) -> &G1Var {
        &self.p1
    }

    /// Public inputs of the verified inner proof, as outer witnesses
    pub fn public_inputs(&self) -> &[FieldVar] {
        &self.public_inputs
    }

    /// Native `[P0, P1]` decoded from the limb witnesses
    pub fn native_points(&self) -> Result<[GroupElement; 2]> {
        Ok([self.p0.get_value()?, self.p1.get_value()?])
    }

    /// Run the deferred pairing check natively
    pub fn pairing_check(&self, lines: &PrecomputedG2Lines) -> Result<bool> {
        Ok(pairing_check(&self.native_points()?, lines))
    }

    /// Expose the eight limbs as public inputs of `composer`
    ///
    /// Order: `P0.x_lo, P0.x_hi, P0.y_lo, P0.y_hi`, then the same for `P1`.
    /// Each limb gets a fresh public variable tied to it by a copy
    /// constraint. Consumes the state.
    pub fn add_proof_outputs_as_public_inputs(self, composer: &mut Composer) {
        for limb in self.p0.limbs().iter().chain(self.p1.limbs().iter()) {
            let public = FieldVar::from_public_witness(composer, limb.value());
            limb.assert_equal(composer, &public, "aggregation output");
        }
        tracing::debug!(
            public_inputs = composer.num_public_inputs(),
            "aggregation outputs exported"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scalar;
    use commitments::{GroupProjective, ReferenceString};
    use group::Curve;
    use plonk_arith::ComposerVariant;
    use std::sync::Arc;

    fn setup() -> (Composer, Arc<ReferenceString>) {
        let srs = Arc::new(ReferenceString::insecure_from_seed(4, b"aggregation-state").unwrap());
        (Composer::new(ComposerVariant::Ultra, srs.clone()), srs)
    }

    #[test]
    fn test_pairing_check_over_tau_relation() {
        let (mut cs, srs) = setup();
        let powers = srs.g1_powers(2).unwrap();
        let lines = srs.verifier_reference_string();

        let good = AggregationState::new(
            G1Var::from_witness(&mut cs, &powers[1]).unwrap(),
            G1Var::from_witness(&mut cs, &(-powers[0])).unwrap(),
            Vec::new(),
        );
        assert!(good.pairing_check(lines.precomputed_g2_lines()).unwrap());

        let bad = AggregationState::new(
            G1Var::from_witness(&mut cs, &powers[1]).unwrap(),
            G1Var::from_witness(&mut cs, &powers[0]).unwrap(),
            Vec::new(),
        );
        assert!(!bad.pairing_check(lines.precomputed_g2_lines()).unwrap());
    }

    #[test]
    fn test_public_input_order() {
        let (mut cs, _) = setup();
        let p0 = (GroupProjective::generator() * Scalar::from(3u64)).to_affine();
        let p1 = (GroupProjective::generator() * Scalar::from(4u64)).to_affine();
        let leading = FieldVar::from_public_witness(&mut cs, Scalar::from(99u64));

        let state = AggregationState::new(
            G1Var::from_witness(&mut cs, &p0).unwrap(),
            G1Var::from_witness(&mut cs, &p1).unwrap(),
            vec![leading],
        );
        state.add_proof_outputs_as_public_inputs(&mut cs);

        let mut expected = vec![Scalar::from(99u64)];
        expected.extend(commitments::g1_to_limbs(&p0).unwrap());
        expected.extend(commitments::g1_to_limbs(&p1).unwrap());
        assert_eq!(cs.public_input_values(), expected);
        assert!(!cs.failed());
        cs.check_circuit().unwrap();
    }
}
