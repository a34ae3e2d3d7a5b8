//! The inner circuit: `c == a + b`

use crate::Scalar;
use plonk_arith::{Composer, FieldVar};
use plonk_core::Circuit;

/// Build the inner circuit
///
/// `a` is private; `b` then `c` are public. The sum `a + b` is a separate
/// witness tied to `c` by a copy constraint, so an inconsistent triple shows
/// up as a failed composer rather than an unsatisfiable gate.
pub fn create_inner_circuit(composer: &mut Composer, inputs: &[Scalar; 3]) {
    let a = FieldVar::from_witness(composer, inputs[0]);
    let b = FieldVar::from_public_witness(composer, inputs[1]);
    let c = FieldVar::from_public_witness(composer, inputs[2]);

    let sum = a.add(composer, &b);
    c.assert_equal(composer, &sum, "c != a + b");
}

/// [`create_inner_circuit`] as a [`Circuit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerCircuit {
    pub inputs: [Scalar; 3],
}

impl InnerCircuit {
    pub fn new(inputs: [Scalar; 3]) -> Self {
        Self { inputs }
    }
}

impl Circuit for InnerCircuit {
    fn synthesize(&self, composer: &mut Composer) -> plonk_core::Result<()> {
        create_inner_circuit(composer, &self.inputs);
        Ok(())
    }
}
