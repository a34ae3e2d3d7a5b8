//! G1 point gadget
//!
//! Points are carried as four limbs `(x_lo, x_hi, y_lo, y_hi)`, see
//! [`commitments::limbs`]. Group operations are constrained by the composer's
//! curve gates. The composer checks them against the native group law while
//! the circuit is built; in a proof their wires are exposed and the verifier
//! repeats the check.

use crate::gates::{Gate, PointWires};
use crate::{ArithError, Composer, FieldVar, GroupElement, Result};
use commitments::{g1_from_limbs, g1_to_limbs, CommitmentError, GroupProjective, Scalar};
use group::Curve;

/// G1 point inside a circuit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct G1Var {
    limbs: [FieldVar; 4],
}

impl G1Var {
    /// Point witness, constrained to lie on the curve
    pub fn from_witness(cs: &mut Composer, point: &GroupElement) -> Result<Self> {
        let limbs = encode(point)?;
        let var = Self {
            limbs: limbs.map(|limb| FieldVar::from_witness(cs, limb)),
        };
        let wires = var.wires(cs);
        cs.create_gate(Gate::OnCurve { point: wires });
        Ok(var)
    }

    /// Point known when the circuit is built
    pub fn constant(point: &GroupElement) -> Result<Self> {
        let limbs = encode(point)?;
        Ok(Self {
            limbs: limbs.map(FieldVar::constant),
        })
    }

    /// Limbs in `(x_lo, x_hi, y_lo, y_hi)` order
    pub fn limbs(&self) -> &[FieldVar; 4] {
        &self.limbs
    }

    pub fn is_constant(&self) -> bool {
        self.limbs.iter().all(FieldVar::is_constant)
    }

    /// Decode the native point from the limb values
    pub fn get_value(&self) -> Result<GroupElement> {
        Ok(g1_from_limbs(&self.limb_values())?)
    }

    fn limb_values(&self) -> [Scalar; 4] {
        self.limbs.map(|limb| limb.value())
    }

    /// Limb variable indices, materializing constants
    pub fn wires(&self, cs: &mut Composer) -> PointWires {
        self.limbs.map(|limb| limb.normalize(cs))
    }

    /// `self + other`
    pub fn add(&self, cs: &mut Composer, other: &G1Var) -> Result<G1Var> {
        let sum = (GroupProjective::from(self.get_value()?) + other.get_value()?).to_affine();
        if self.is_constant() && other.is_constant() {
            return G1Var::constant(&sum);
        }

        let out = G1Var::unchecked_witness(cs, &sum)?;
        let gate = Gate::EccAdd {
            lhs: self.wires(cs),
            rhs: other.wires(cs),
            out: out.wires(cs),
        };
        cs.create_gate(gate);
        Ok(out)
    }

    /// `scalar * self`
    pub fn scalar_mul(&self, cs: &mut Composer, scalar: &FieldVar) -> Result<G1Var> {
        let product = (GroupProjective::from(self.get_value()?) * scalar.value()).to_affine();
        if self.is_constant() && scalar.is_constant() {
            return G1Var::constant(&product);
        }

        let out = G1Var::unchecked_witness(cs, &product)?;
        let gate = Gate::EccMul {
            base: self.wires(cs),
            scalar: scalar.normalize(cs),
            out: out.wires(cs),
        };
        cs.create_gate(gate);
        Ok(out)
    }

    /// `-self`
    pub fn neg(&self, cs: &mut Composer) -> Result<G1Var> {
        self.scalar_mul(cs, &FieldVar::constant(-Scalar::from(1u64)))
    }

    /// `sum_i scalars[i] * points[i]`
    pub fn msm(cs: &mut Composer, points: &[G1Var], scalars: &[FieldVar]) -> Result<G1Var> {
        if points.len() != scalars.len() || points.is_empty() {
            return Err(ArithError::InvalidCircuit(format!(
                "msm over {} points and {} scalars",
                points.len(),
                scalars.len()
            )));
        }

        let mut acc = points[0].scalar_mul(cs, &scalars[0])?;
        for (point, scalar) in points.iter().zip(scalars.iter()).skip(1) {
            let term = point.scalar_mul(cs, scalar)?;
            acc = acc.add(cs, &term)?;
        }
        Ok(acc)
    }

    /// Constrain limb-wise equality
    pub fn assert_equal(&self, cs: &mut Composer, other: &G1Var, msg: &str) {
        for (lhs, rhs) in self.limbs.iter().zip(other.limbs.iter()) {
            lhs.assert_equal(cs, rhs, msg);
        }
    }

    /// Output of a group-law gate; the gate itself checks the encoding
    fn unchecked_witness(cs: &mut Composer, point: &GroupElement) -> Result<G1Var> {
        let limbs = encode(point)?;
        Ok(Self {
            limbs: limbs.map(|limb| FieldVar::from_witness(cs, limb)),
        })
    }
}

fn encode(point: &GroupElement) -> Result<[Scalar; 4]> {
    g1_to_limbs(point).map_err(|err| match err {
        CommitmentError::DegenerateCommitment(_) => ArithError::PointAtInfinity,
        other => ArithError::Commitment(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComposerVariant;
    use commitments::ReferenceString;
    use std::sync::Arc;

    fn composer() -> Composer {
        let srs = ReferenceString::insecure_from_seed(4, b"curve-tests").unwrap();
        Composer::new(ComposerVariant::Ultra, Arc::new(srs))
    }

    fn multiple(k: u64) -> GroupElement {
        (GroupProjective::generator() * Scalar::from(k)).to_affine()
    }

    #[test]
    fn test_witness_roundtrip() {
        let mut cs = composer();
        let point = multiple(17);
        let var = G1Var::from_witness(&mut cs, &point).unwrap();
        assert_eq!(var.get_value().unwrap(), point);
        assert!(!var.is_constant());
        assert!(!cs.failed());
    }

    #[test]
    fn test_identity_rejected() {
        let mut cs = composer();
        assert_eq!(
            G1Var::from_witness(&mut cs, &GroupElement::identity()),
            Err(ArithError::PointAtInfinity)
        );
        assert_eq!(
            G1Var::constant(&GroupElement::identity()),
            Err(ArithError::PointAtInfinity)
        );
    }

    #[test]
    fn test_add_and_scalar_mul() {
        let mut cs = composer();
        let p = G1Var::from_witness(&mut cs, &multiple(3)).unwrap();
        let q = G1Var::constant(&multiple(4)).unwrap();
        let k = FieldVar::from_witness(&mut cs, Scalar::from(5u64));

        assert_eq!(p.add(&mut cs, &q).unwrap().get_value().unwrap(), multiple(7));
        assert_eq!(p.scalar_mul(&mut cs, &k).unwrap().get_value().unwrap(), multiple(15));
        assert_eq!(
            p.neg(&mut cs).unwrap().get_value().unwrap(),
            (-GroupProjective::from(multiple(3))).to_affine()
        );
        assert!(!cs.failed(), "{}", cs.err());
        cs.check_circuit().unwrap();
    }

    #[test]
    fn test_constant_ops_add_no_gates() {
        let mut cs = composer();
        let gates = cs.num_gates();
        let p = G1Var::constant(&multiple(2)).unwrap();
        let k = FieldVar::constant(Scalar::from(3u64));
        let r = p.scalar_mul(&mut cs, &k).unwrap();
        assert!(r.is_constant());
        assert_eq!(r.get_value().unwrap(), multiple(6));
        assert_eq!(cs.num_gates(), gates);
    }

    #[test]
    fn test_msm() {
        let mut cs = composer();
        let points: Vec<G1Var> = (1..=3)
            .map(|k| G1Var::from_witness(&mut cs, &multiple(k)).unwrap())
            .collect();
        let scalars: Vec<FieldVar> = (4u64..=6)
            .map(|k| FieldVar::from_witness(&mut cs, Scalar::from(k)))
            .collect();

        // 1*4 + 2*5 + 3*6 = 32
        let result = G1Var::msm(&mut cs, &points, &scalars).unwrap();
        assert_eq!(result.get_value().unwrap(), multiple(32));
        cs.check_circuit().unwrap();

        assert!(G1Var::msm(&mut cs, &points, &scalars[..2]).is_err());
    }

    #[test]
    fn test_tampered_limb_fails_gate() {
        let mut cs = composer();
        let p = G1Var::from_witness(&mut cs, &multiple(3)).unwrap();
        let wires = p.wires(&mut cs);
        let bogus = cs.add_variable(Scalar::from(1u64));
        let tampered = [wires[0], wires[1], bogus, wires[3]];
        cs.create_gate(Gate::OnCurve { point: tampered });
        assert!(cs.failed());
    }
}
