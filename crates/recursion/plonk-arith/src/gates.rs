//! Gate definitions
//!
//! Wires are variable indices into the composer's witness vector.

use crate::{GroupElement, Scalar};
use commitments::transcript::{permute_round, WIDTH};
use commitments::{g1_from_limbs, GroupProjective, HashKind};
use ff::Field;
use group::Curve;

/// Four limb wires `[x_lo, x_hi, y_lo, y_hi]` of an in-circuit G1 point
pub type PointWires = [u32; 4];

/// Standard PLONK gate
/// Represents: q_m * a * b + q_l * a + q_r * b + q_o * c + q_c = 0
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticGate {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub q_m: Scalar,
    pub q_l: Scalar,
    pub q_r: Scalar,
    pub q_o: Scalar,
    pub q_c: Scalar,
}

impl ArithmeticGate {
    /// Gate with all selectors zero
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self {
            a,
            b,
            c,
            q_m: Scalar::ZERO,
            q_l: Scalar::ZERO,
            q_r: Scalar::ZERO,
            q_o: Scalar::ZERO,
            q_c: Scalar::ZERO,
        }
    }

    /// `a + b = c`
    pub fn addition(a: u32, b: u32, c: u32) -> Self {
        Self {
            q_l: Scalar::ONE,
            q_r: Scalar::ONE,
            q_o: -Scalar::ONE,
            ..Self::new(a, b, c)
        }
    }

    /// `a * b = c`
    pub fn multiplication(a: u32, b: u32, c: u32) -> Self {
        Self {
            q_m: Scalar::ONE,
            q_o: -Scalar::ONE,
            ..Self::new(a, b, c)
        }
    }

    /// Evaluate the gate polynomial for given wire values
    pub fn evaluate(&self, a: Scalar, b: Scalar, c: Scalar) -> Scalar {
        self.q_m * a * b + self.q_l * a + self.q_r * b + self.q_o * c + self.q_c
    }
}

/// A gate recorded by the composer
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Width-3 arithmetic gate
    Arithmetic(ArithmeticGate),
    /// One round of the transcript permutation: `output = round(input)`
    HashRound {
        kind: HashKind,
        round: usize,
        input: [u32; 3],
        output: [u32; 3],
    },
    /// The limbs decode to a non-identity point of the prime-order subgroup
    OnCurve { point: PointWires },
    /// `out = lhs + rhs`
    EccAdd {
        lhs: PointWires,
        rhs: PointWires,
        out: PointWires,
    },
    /// `out = scalar * base`
    EccMul {
        base: PointWires,
        scalar: u32,
        out: PointWires,
    },
}

impl Gate {
    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Arithmetic(_) => "arithmetic",
            Gate::HashRound { .. } => "hash-round",
            Gate::OnCurve { .. } => "on-curve",
            Gate::EccAdd { .. } => "ecc-add",
            Gate::EccMul { .. } => "ecc-mul",
        }
    }

    /// Whether the gate is a width-3 arithmetic gate
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Gate::Arithmetic(_))
    }

    /// Every variable index the gate reads
    pub fn wires(&self) -> Vec<u32> {
        match self {
            Gate::Arithmetic(gate) => vec![gate.a, gate.b, gate.c],
            Gate::HashRound { input, output, .. } => {
                input.iter().chain(output.iter()).copied().collect()
            }
            Gate::OnCurve { point } => point.to_vec(),
            Gate::EccAdd { lhs, rhs, out } => lhs
                .iter()
                .chain(rhs.iter())
                .chain(out.iter())
                .copied()
                .collect(),
            Gate::EccMul { base, scalar, out } => base
                .iter()
                .chain(std::iter::once(scalar))
                .chain(out.iter())
                .copied()
                .collect(),
        }
    }

    /// Same gate with each wire replaced by `f(wire)`, visited in
    /// [`Gate::wires`] order
    pub fn map_wires(&self, mut f: impl FnMut(u32) -> u32) -> Gate {
        match self {
            Gate::Arithmetic(gate) => {
                let (a, b, c) = (f(gate.a), f(gate.b), f(gate.c));
                Gate::Arithmetic(ArithmeticGate {
                    a,
                    b,
                    c,
                    ..gate.clone()
                })
            }
            Gate::HashRound {
                kind,
                round,
                input,
                output,
            } => {
                let input = input.map(&mut f);
                let output = output.map(&mut f);
                Gate::HashRound {
                    kind: *kind,
                    round: *round,
                    input,
                    output,
                }
            }
            Gate::OnCurve { point } => Gate::OnCurve {
                point: point.map(&mut f),
            },
            Gate::EccAdd { lhs, rhs, out } => {
                let lhs = lhs.map(&mut f);
                let rhs = rhs.map(&mut f);
                let out = out.map(&mut f);
                Gate::EccAdd { lhs, rhs, out }
            }
            Gate::EccMul { base, scalar, out } => {
                let base = base.map(&mut f);
                let scalar = f(*scalar);
                let out = out.map(&mut f);
                Gate::EccMul { base, scalar, out }
            }
        }
    }

    /// Check the gate relation against wire values read through `value`
    pub fn check(&self, value: impl Fn(u32) -> Scalar) -> std::result::Result<(), String> {
        let point = |wires: &PointWires| -> std::result::Result<GroupElement, String> {
            g1_from_limbs(&wires.map(&value)).map_err(|e| e.to_string())
        };
        match self {
            Gate::Arithmetic(g) => {
                if g.evaluate(value(g.a), value(g.b), value(g.c)) != Scalar::ZERO {
                    return Err("gate polynomial is non-zero".to_string());
                }
            }
            Gate::HashRound {
                kind,
                round,
                input,
                output,
            } => {
                if *round >= kind.num_rounds() {
                    return Err(format!("round {} out of range", round));
                }
                let mut state: [Scalar; WIDTH] = input.map(&value);
                permute_round(*kind, *round, &mut state);
                if state != output.map(&value) {
                    return Err("output is not the permutation round of the input".to_string());
                }
            }
            Gate::OnCurve { point: wires } => {
                point(wires)?;
            }
            Gate::EccAdd { lhs, rhs, out } => {
                let sum = GroupProjective::from(point(lhs)?) + point(rhs)?;
                if sum.to_affine() != point(out)? {
                    return Err("output is not the sum of the inputs".to_string());
                }
            }
            Gate::EccMul { base, scalar, out } => {
                let product = GroupProjective::from(point(base)?) * value(*scalar);
                if product.to_affine() != point(out)? {
                    return Err("output is not the scalar multiple of the base".to_string());
                }
            }
        }
        Ok(())
    }
}
