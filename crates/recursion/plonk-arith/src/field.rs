//! Scalar-field gadget
//!
//! A [`FieldVar`] is either a compile-time constant or a witness of the
//! composer. Operations between constants fold without adding gates; anything
//! touching a witness adds exactly one arithmetic gate.

use crate::gates::ArithmeticGate;
use crate::{ArithError, Composer, Result, Scalar};
use ff::Field;

/// Field element inside a circuit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVar {
    value: Scalar,
    witness: Option<u32>,
}

impl FieldVar {
    /// Constant known when the circuit is built
    pub fn constant(value: Scalar) -> Self {
        Self {
            value,
            witness: None,
        }
    }

    /// New private witness
    pub fn from_witness(cs: &mut Composer, value: Scalar) -> Self {
        Self {
            value,
            witness: Some(cs.add_variable(value)),
        }
    }

    /// New public witness, appended to the composer's public inputs
    pub fn from_public_witness(cs: &mut Composer, value: Scalar) -> Self {
        Self {
            value,
            witness: Some(cs.add_public_variable(value)),
        }
    }

    /// Wrap an existing variable
    pub fn from_witness_index(cs: &Composer, index: u32) -> Self {
        Self {
            value: cs.get_variable(index),
            witness: Some(index),
        }
    }

    /// Current value
    pub fn value(&self) -> Scalar {
        self.value
    }

    /// Variable index, `None` for constants
    pub fn witness_index(&self) -> Option<u32> {
        self.witness
    }

    pub fn is_constant(&self) -> bool {
        self.witness.is_none()
    }

    /// Variable index holding this value, materializing constants
    pub fn normalize(&self, cs: &mut Composer) -> u32 {
        match self.witness {
            Some(index) => index,
            None => cs.put_constant_variable(self.value),
        }
    }

    /// `self + other`
    pub fn add(&self, cs: &mut Composer, other: &FieldVar) -> FieldVar {
        let value = self.value + other.value;
        match (self.witness, other.witness) {
            (None, None) => FieldVar::constant(value),
            (Some(a), None) => linear(cs, a, Scalar::ONE, other.value, value),
            (None, Some(b)) => linear(cs, b, Scalar::ONE, self.value, value),
            (Some(a), Some(b)) => {
                let out = cs.add_variable(value);
                cs.create_arithmetic_gate(ArithmeticGate::addition(a, b, out));
                FieldVar {
                    value,
                    witness: Some(out),
                }
            }
        }
    }

    /// `self - other`
    pub fn sub(&self, cs: &mut Composer, other: &FieldVar) -> FieldVar {
        let value = self.value - other.value;
        match (self.witness, other.witness) {
            (None, None) => FieldVar::constant(value),
            (Some(a), None) => linear(cs, a, Scalar::ONE, -other.value, value),
            (None, Some(b)) => linear(cs, b, -Scalar::ONE, self.value, value),
            (Some(a), Some(b)) => {
                let out = cs.add_variable(value);
                cs.create_arithmetic_gate(ArithmeticGate {
                    q_l: Scalar::ONE,
                    q_r: -Scalar::ONE,
                    q_o: -Scalar::ONE,
                    ..ArithmeticGate::new(a, b, out)
                });
                FieldVar {
                    value,
                    witness: Some(out),
                }
            }
        }
    }

    /// `-self`
    pub fn neg(&self, cs: &mut Composer) -> FieldVar {
        FieldVar::constant(Scalar::ZERO).sub(cs, self)
    }

    /// `self * other`
    pub fn mul(&self, cs: &mut Composer, other: &FieldVar) -> FieldVar {
        let value = self.value * other.value;
        match (self.witness, other.witness) {
            (None, None) => FieldVar::constant(value),
            (Some(a), None) => linear(cs, a, other.value, Scalar::ZERO, value),
            (None, Some(b)) => linear(cs, b, self.value, Scalar::ZERO, value),
            (Some(a), Some(b)) => {
                let out = cs.add_variable(value);
                cs.create_arithmetic_gate(ArithmeticGate::multiplication(a, b, out));
                FieldVar {
                    value,
                    witness: Some(out),
                }
            }
        }
    }

    /// `self * constant`
    pub fn mul_constant(&self, cs: &mut Composer, constant: Scalar) -> FieldVar {
        self.mul(cs, &FieldVar::constant(constant))
    }

    /// `self + constant`
    pub fn add_constant(&self, cs: &mut Composer, constant: Scalar) -> FieldVar {
        self.add(cs, &FieldVar::constant(constant))
    }

    /// `self * self`
    pub fn square(&self, cs: &mut Composer) -> FieldVar {
        self.mul(cs, self)
    }

    /// `self * to_mul + to_add`
    pub fn madd(&self, cs: &mut Composer, to_mul: &FieldVar, to_add: &FieldVar) -> FieldVar {
        self.mul(cs, to_mul).add(cs, to_add)
    }

    /// `self / other`, constrained as `quotient * other = self`
    pub fn div(&self, cs: &mut Composer, other: &FieldVar) -> Result<FieldVar> {
        let inverse: Option<Scalar> = other.value.invert().into();
        let inverse = inverse.ok_or(ArithError::DivisionByZero)?;
        let value = self.value * inverse;

        let divisor = match other.witness {
            None => return Ok(self.mul_constant(cs, inverse)),
            Some(index) => index,
        };

        let quotient = cs.add_variable(value);
        let zero = cs.zero_idx();
        let gate = match self.witness {
            Some(numerator) => ArithmeticGate {
                q_m: Scalar::ONE,
                q_o: -Scalar::ONE,
                ..ArithmeticGate::new(quotient, divisor, numerator)
            },
            None => ArithmeticGate {
                q_m: Scalar::ONE,
                q_c: -self.value,
                ..ArithmeticGate::new(quotient, divisor, zero)
            },
        };
        cs.create_arithmetic_gate(gate);

        Ok(FieldVar {
            value,
            witness: Some(quotient),
        })
    }

    /// `self^(2^k)` by repeated squaring
    pub fn pow2k(&self, cs: &mut Composer, k: u32) -> FieldVar {
        (0..k).fold(*self, |acc, _| acc.square(cs))
    }

    /// Constrain `self == other`
    pub fn assert_equal(&self, cs: &mut Composer, other: &FieldVar, msg: &str) {
        match (self.witness, other.witness) {
            (None, None) => {
                if self.value != other.value {
                    cs.failure(msg);
                }
            }
            (Some(a), None) => cs.assert_equal_constant(a, other.value, msg),
            (None, Some(b)) => cs.assert_equal_constant(b, self.value, msg),
            (Some(a), Some(b)) => cs.assert_equal(a, b, msg),
        }
    }
}

/// `out = scale * input + offset` in one gate
fn linear(cs: &mut Composer, input: u32, scale: Scalar, offset: Scalar, value: Scalar) -> FieldVar {
    let out = cs.add_variable(value);
    let zero = cs.zero_idx();
    cs.create_arithmetic_gate(ArithmeticGate {
        q_l: scale,
        q_o: -Scalar::ONE,
        q_c: offset,
        ..ArithmeticGate::new(input, zero, out)
    });
    FieldVar {
        value,
        witness: Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComposerVariant;
    use commitments::ReferenceString;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn composer() -> Composer {
        let srs = ReferenceString::insecure_from_seed(4, b"field-tests").unwrap();
        Composer::new(ComposerVariant::Standard, Arc::new(srs))
    }

    #[test]
    fn test_constants_fold_without_gates() {
        let mut cs = composer();
        let gates = cs.num_gates();
        let a = FieldVar::constant(Scalar::from(3u64));
        let b = FieldVar::constant(Scalar::from(4u64));
        let c = a.mul(&mut cs, &b).add(&mut cs, &a).sub(&mut cs, &b);
        assert!(c.is_constant());
        assert_eq!(c.value(), Scalar::from(11u64));
        assert_eq!(cs.num_gates(), gates);
    }

    #[test]
    fn test_witness_arithmetic() {
        let mut cs = composer();
        let a = FieldVar::from_witness(&mut cs, Scalar::from(5u64));
        let b = FieldVar::from_witness(&mut cs, Scalar::from(7u64));
        let k = FieldVar::constant(Scalar::from(2u64));

        let sum = a.add(&mut cs, &b);
        let diff = a.sub(&mut cs, &b);
        let prod = a.mul(&mut cs, &b);
        let scaled = k.mul(&mut cs, &a);
        let shifted = k.sub(&mut cs, &b);
        let neg = a.neg(&mut cs);

        assert_eq!(sum.value(), Scalar::from(12u64));
        assert_eq!(diff.value(), -Scalar::from(2u64));
        assert_eq!(prod.value(), Scalar::from(35u64));
        assert_eq!(scaled.value(), Scalar::from(10u64));
        assert_eq!(shifted.value(), -Scalar::from(5u64));
        assert_eq!(neg.value(), -Scalar::from(5u64));
        assert!(!cs.failed());
        cs.check_circuit().unwrap();
    }

    #[test]
    fn test_division() {
        let mut cs = composer();
        let a = FieldVar::from_witness(&mut cs, Scalar::from(35u64));
        let b = FieldVar::from_witness(&mut cs, Scalar::from(7u64));
        let c = FieldVar::constant(Scalar::from(14u64));

        assert_eq!(a.div(&mut cs, &b).unwrap().value(), Scalar::from(5u64));
        assert_eq!(c.div(&mut cs, &b).unwrap().value(), Scalar::from(2u64));
        assert_eq!(a.div(&mut cs, &c).unwrap().value() * Scalar::from(2u64), Scalar::from(5u64));
        cs.check_circuit().unwrap();

        let zero = FieldVar::from_witness(&mut cs, Scalar::ZERO);
        assert_eq!(a.div(&mut cs, &zero), Err(ArithError::DivisionByZero));
    }

    #[test]
    fn test_pow2k() {
        let mut cs = composer();
        let x = FieldVar::from_witness(&mut cs, Scalar::from(3u64));
        assert_eq!(x.pow2k(&mut cs, 3).value(), Scalar::from(6561u64));
        cs.check_circuit().unwrap();
    }

    #[test]
    fn test_assert_equal_mismatch() {
        let mut cs = composer();
        let a = FieldVar::from_witness(&mut cs, Scalar::from(12u64));
        let b = FieldVar::constant(Scalar::from(13u64));
        a.assert_equal(&mut cs, &b, "c == a + b");
        assert!(cs.failed());
        assert_eq!(cs.err(), "c == a + b");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_madd_matches_native(x in any::<u64>(), y in any::<u64>(), z in any::<u64>()) {
            let mut cs = composer();
            let (x, y, z) = (Scalar::from(x), Scalar::from(y), Scalar::from(z));
            let xv = FieldVar::from_witness(&mut cs, x);
            let yv = FieldVar::from_witness(&mut cs, y);
            let zv = FieldVar::constant(z);
            let result = xv.madd(&mut cs, &yv, &zv);
            prop_assert_eq!(result.value(), x * y + z);
            prop_assert!(cs.check_circuit().is_ok());
        }
    }
}
