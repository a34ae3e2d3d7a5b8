//! The constraint composer
//!
//! Every gate is checked against the current witness as soon as it is added.
//! A violated gate or copy constraint does not abort construction; it records
//! the first failure message and sets [`Composer::failed`].

use crate::gates::{ArithmeticGate, Gate};
use crate::{ArithError, ComposerVariant, Result, Scalar};
use commitments::ReferenceString;
use ff::Field;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Mutable constraint system for one circuit
#[derive(Debug)]
pub struct Composer {
    variant: ComposerVariant,
    reference_string: Arc<ReferenceString>,
    variables: Vec<Scalar>,
    /// Parent pointers of the copy-constraint classes
    real_variable_index: Vec<u32>,
    public_inputs: Vec<u32>,
    gates: Vec<Gate>,
    constant_variables: HashMap<[u8; 32], u32>,
    zero_idx: u32,
    failed: bool,
    err: String,
    finalized: bool,
}

impl Composer {
    /// Create an empty composer over a loaded reference string
    pub fn new(variant: ComposerVariant, reference_string: Arc<ReferenceString>) -> Self {
        let mut composer = Self {
            variant,
            reference_string,
            variables: Vec::new(),
            real_variable_index: Vec::new(),
            public_inputs: Vec::new(),
            gates: Vec::new(),
            constant_variables: HashMap::new(),
            zero_idx: 0,
            failed: false,
            err: String::new(),
            finalized: false,
        };

        let zero = composer.add_variable(Scalar::ZERO);
        composer.zero_idx = zero;
        composer
            .constant_variables
            .insert(Scalar::ZERO.to_bytes(), zero);
        composer.create_arithmetic_gate(ArithmeticGate {
            q_l: Scalar::ONE,
            ..ArithmeticGate::new(zero, zero, zero)
        });
        composer
    }

    /// Create an empty composer, loading the reference string from disk
    pub fn from_srs_path(variant: ComposerVariant, path: impl AsRef<Path>) -> Result<Self> {
        let reference_string = ReferenceString::read_from_path(path)?;
        Ok(Self::new(variant, Arc::new(reference_string)))
    }

    /// Proof-system variant
    pub fn variant(&self) -> ComposerVariant {
        self.variant
    }

    /// Shared reference string
    pub fn reference_string(&self) -> &Arc<ReferenceString> {
        &self.reference_string
    }

    /// Index of the variable fixed to zero
    pub fn zero_idx(&self) -> u32 {
        self.zero_idx
    }

    /// Allocate a private witness
    pub fn add_variable(&mut self, value: Scalar) -> u32 {
        let index = self.variables.len() as u32;
        self.variables.push(value);
        self.real_variable_index.push(index);
        index
    }

    /// Allocate a public witness, appended to the public-input vector
    pub fn add_public_variable(&mut self, value: Scalar) -> u32 {
        let index = self.add_variable(value);
        self.public_inputs.push(index);
        index
    }

    /// Mark an existing variable as the next public input
    pub fn set_public_input(&mut self, index: u32) {
        if !self.is_valid_index(index) {
            self.failure(format!("public input refers to unknown variable {}", index));
            return;
        }
        if self.public_inputs.contains(&index) {
            self.failure(format!("variable {} is already a public input", index));
            return;
        }
        self.public_inputs.push(index);
    }

    /// Value of a variable, resolved through its copy-constraint class
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by this composer. Use
    /// [`Composer::try_get_variable`] for indices from untrusted input.
    pub fn get_variable(&self, index: u32) -> Scalar {
        assert!(self.is_valid_index(index), "unknown variable {}", index);
        self.variables[self.real_variable_index(index) as usize]
    }

    /// Value of a variable, or an error for an unknown index
    pub fn try_get_variable(&self, index: u32) -> Result<Scalar> {
        if !self.is_valid_index(index) {
            return Err(ArithError::InvalidCircuit(format!(
                "unknown variable {}",
                index
            )));
        }
        Ok(self.variables[self.real_variable_index(index) as usize])
    }

    /// Representative of the variable's copy-constraint class
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by this composer.
    pub fn real_variable_index(&self, index: u32) -> u32 {
        let mut current = index;
        loop {
            let parent = self.real_variable_index[current as usize];
            if parent == current {
                return current;
            }
            current = parent;
        }
    }

    /// Variable fixed to `value` by a gate, shared between callers
    pub fn put_constant_variable(&mut self, value: Scalar) -> u32 {
        let key = value.to_bytes();
        if let Some(index) = self.constant_variables.get(&key) {
            return *index;
        }

        let index = self.add_variable(value);
        let zero = self.zero_idx;
        self.create_arithmetic_gate(ArithmeticGate {
            q_l: Scalar::ONE,
            q_c: -value,
            ..ArithmeticGate::new(index, zero, zero)
        });
        self.constant_variables.insert(key, index);
        index
    }

    /// Add a width-3 arithmetic gate
    pub fn create_arithmetic_gate(&mut self, gate: ArithmeticGate) {
        self.create_gate(Gate::Arithmetic(gate));
    }

    /// Constrain a variable to be 0 or 1
    pub fn create_bool_gate(&mut self, index: u32) {
        let zero = self.zero_idx;
        self.create_arithmetic_gate(ArithmeticGate {
            q_m: Scalar::ONE,
            q_l: -Scalar::ONE,
            ..ArithmeticGate::new(index, index, zero)
        });
    }

    /// Add any gate supported by this composer's variant
    pub fn create_gate(&mut self, gate: Gate) {
        if self.finalized {
            self.failure(format!("{} gate added after finalization", gate.name()));
            return;
        }
        if matches!(gate, Gate::HashRound { .. }) && !self.variant.has_hash_round_gate() {
            self.failure(format!("{:?} composer has no hash-round gate", self.variant));
            return;
        }
        if let Some(index) = gate.wires().into_iter().find(|w| !self.is_valid_index(*w)) {
            self.failure(format!("{} gate uses unknown variable {}", gate.name(), index));
            return;
        }

        if let Err(reason) = self.check_gate(&gate) {
            self.failure(format!(
                "{} gate {} not satisfied: {}",
                gate.name(),
                self.gates.len(),
                reason
            ));
        }
        self.gates.push(gate);
    }

    /// Copy constraint between two variables
    pub fn assert_equal(&mut self, a: u32, b: u32, msg: &str) {
        if !self.is_valid_index(a) || !self.is_valid_index(b) {
            self.failure(format!("{}: unknown variable", msg));
            return;
        }
        if self.get_variable(a) != self.get_variable(b) {
            self.failure(msg);
        }

        let real_a = self.real_variable_index(a);
        let real_b = self.real_variable_index(b);
        if real_a != real_b {
            self.real_variable_index[real_b as usize] = real_a;
        }
    }

    /// Copy constraint between a variable and a constant
    pub fn assert_equal_constant(&mut self, a: u32, value: Scalar, msg: &str) {
        let constant = self.put_constant_variable(value);
        self.assert_equal(a, constant, msg);
    }

    /// Record a failure; only the first message is kept
    pub fn failure(&mut self, msg: impl Into<String>) {
        if !self.failed {
            self.failed = true;
            self.err = msg.into();
            tracing::debug!(err = %self.err, "composer failure");
        }
    }

    /// Whether any constraint has been violated
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// First failure message, empty if none
    pub fn err(&self) -> &str {
        &self.err
    }

    /// Close the circuit to further gates
    ///
    /// Adds a gate with every selector non-zero so that no selector
    /// polynomial, and hence no verification-key commitment, is identically
    /// zero. Calling this twice is a no-op.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        let one = self.add_variable(Scalar::ONE);
        let two = self.add_variable(Scalar::from(2u64));
        let three = self.add_variable(Scalar::from(3u64));
        self.create_arithmetic_gate(ArithmeticGate {
            a: one,
            b: two,
            c: three,
            q_m: Scalar::ONE,
            q_l: Scalar::ONE,
            q_r: Scalar::ONE,
            q_o: Scalar::ONE,
            q_c: -Scalar::from(8u64),
        });

        self.finalized = true;
        tracing::debug!(
            variant = ?self.variant,
            gates = self.gates.len(),
            variables = self.variables.len(),
            public_inputs = self.public_inputs.len(),
            "composer finalized"
        );
    }

    /// Whether [`Composer::finalize`] has run
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Recorded gates in insertion order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of recorded gates
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Number of allocated variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Public-input variable indices in declaration order
    pub fn public_inputs(&self) -> &[u32] {
        &self.public_inputs
    }

    /// Public-input values in declaration order
    pub fn public_input_values(&self) -> Vec<Scalar> {
        self.public_inputs
            .iter()
            .map(|index| self.get_variable(*index))
            .collect()
    }

    /// Number of public inputs
    pub fn num_public_inputs(&self) -> usize {
        self.public_inputs.len()
    }

    /// Re-check every gate and copy constraint against the witness
    pub fn check_circuit(&self) -> Result<()> {
        if self.failed {
            return Err(ArithError::Unsatisfied(self.err.clone()));
        }

        for (i, gate) in self.gates.iter().enumerate() {
            self.check_gate(gate).map_err(|reason| {
                ArithError::Unsatisfied(format!("{} gate {}: {}", gate.name(), i, reason))
            })?;
        }

        for index in 0..self.variables.len() {
            let real = self.real_variable_index(index as u32) as usize;
            if self.variables[index] != self.variables[real] {
                return Err(ArithError::Unsatisfied(format!(
                    "copy constraint between variables {} and {}",
                    index, real
                )));
            }
        }

        Ok(())
    }

    fn is_valid_index(&self, index: u32) -> bool {
        (index as usize) < self.variables.len()
    }

    fn check_gate(&self, gate: &Gate) -> std::result::Result<(), String> {
        gate.check(|w| self.get_variable(w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GroupElement;
    use commitments::transcript::permute_round;
    use commitments::{g1_to_limbs, GroupProjective, HashKind};
    use group::Curve;

    fn composer(variant: ComposerVariant) -> Composer {
        let srs = ReferenceString::insecure_from_seed(8, b"composer-tests").unwrap();
        Composer::new(variant, Arc::new(srs))
    }

    #[test]
    fn test_new_composer_is_satisfied() {
        let cs = composer(ComposerVariant::Standard);
        assert_eq!(cs.num_gates(), 1);
        assert_eq!(cs.get_variable(cs.zero_idx()), Scalar::ZERO);
        assert!(!cs.failed());
        cs.check_circuit().unwrap();
    }

    #[test]
    fn test_public_inputs_in_declaration_order() {
        let mut cs = composer(ComposerVariant::Ultra);
        let a = cs.add_variable(Scalar::from(5u64));
        let b = cs.add_public_variable(Scalar::from(7u64));
        cs.set_public_input(a);
        assert_eq!(cs.public_inputs(), &[b, a]);
        assert_eq!(
            cs.public_input_values(),
            vec![Scalar::from(7u64), Scalar::from(5u64)]
        );
    }

    #[test]
    fn test_duplicate_public_input_fails() {
        let mut cs = composer(ComposerVariant::Ultra);
        let a = cs.add_public_variable(Scalar::ONE);
        cs.set_public_input(a);
        assert!(cs.failed());
        assert!(cs.err().contains("already a public input"));
    }

    #[test]
    fn test_assert_equal() {
        let mut cs = composer(ComposerVariant::Standard);
        let a = cs.add_variable(Scalar::from(12u64));
        let b = cs.add_variable(Scalar::from(12u64));
        cs.assert_equal(a, b, "equal values");
        assert!(!cs.failed());
        assert_eq!(cs.real_variable_index(b), cs.real_variable_index(a));

        let c = cs.add_variable(Scalar::from(13u64));
        cs.assert_equal(a, c, "twelve is not thirteen");
        assert!(cs.failed());
        assert_eq!(cs.err(), "twelve is not thirteen");
        assert!(cs.check_circuit().is_err());
    }

    #[test]
    fn test_unknown_variable_lookup() {
        let cs = composer(ComposerVariant::Standard);
        assert_eq!(cs.try_get_variable(cs.zero_idx()), Ok(Scalar::ZERO));
        assert!(matches!(
            cs.try_get_variable(1000),
            Err(ArithError::InvalidCircuit(msg)) if msg.contains("1000")
        ));
    }

    #[test]
    #[should_panic(expected = "unknown variable 1000")]
    fn test_get_variable_panics_on_unknown_index() {
        composer(ComposerVariant::Standard).get_variable(1000);
    }

    #[test]
    fn test_first_failure_is_kept() {
        let mut cs = composer(ComposerVariant::Standard);
        cs.failure("first");
        cs.failure("second");
        assert_eq!(cs.err(), "first");
    }

    #[test]
    fn test_unsatisfied_gate_sets_failure() {
        let mut cs = composer(ComposerVariant::Standard);
        let a = cs.add_variable(Scalar::from(2u64));
        let b = cs.add_variable(Scalar::from(3u64));
        let c = cs.add_variable(Scalar::from(7u64));
        cs.create_arithmetic_gate(ArithmeticGate::addition(a, b, c));
        assert!(cs.failed());
        assert!(cs.err().contains("arithmetic gate"));
    }

    #[test]
    fn test_constant_variables_are_cached() {
        let mut cs = composer(ComposerVariant::Standard);
        let x = cs.put_constant_variable(Scalar::from(9u64));
        let y = cs.put_constant_variable(Scalar::from(9u64));
        assert_eq!(x, y);
        assert_eq!(cs.put_constant_variable(Scalar::ZERO), cs.zero_idx());
        cs.check_circuit().unwrap();
    }

    #[test]
    fn test_bool_gate() {
        let mut cs = composer(ComposerVariant::Standard);
        let bit = cs.add_variable(Scalar::ONE);
        cs.create_bool_gate(bit);
        assert!(!cs.failed());

        let not_bit = cs.add_variable(Scalar::from(2u64));
        cs.create_bool_gate(not_bit);
        assert!(cs.failed());
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut cs = composer(ComposerVariant::Ultra);
        cs.finalize();
        let gates = cs.num_gates();
        cs.finalize();
        assert_eq!(cs.num_gates(), gates);
        assert!(cs.is_finalized());
        cs.check_circuit().unwrap();

        match cs.gates().last() {
            Some(Gate::Arithmetic(guard)) => {
                for selector in [guard.q_m, guard.q_l, guard.q_r, guard.q_o, guard.q_c] {
                    assert_ne!(selector, Scalar::ZERO);
                }
            }
            other => panic!("unexpected final gate {:?}", other),
        }
    }

    #[test]
    fn test_gate_after_finalize_fails() {
        let mut cs = composer(ComposerVariant::Ultra);
        cs.finalize();
        let zero = cs.zero_idx();
        cs.create_arithmetic_gate(ArithmeticGate::addition(zero, zero, zero));
        assert!(cs.failed());
    }

    #[test]
    fn test_hash_round_gate_requires_ultra() {
        for (variant, should_fail) in [
            (ComposerVariant::Standard, true),
            (ComposerVariant::Ultra, false),
        ] {
            let mut cs = composer(variant);
            let mut state = [Scalar::ONE, Scalar::from(2u64), Scalar::from(3u64)];
            let input = state.map(|v| cs.add_variable(v));
            permute_round(HashKind::Ultra, 0, &mut state);
            let output = state.map(|v| cs.add_variable(v));
            cs.create_gate(Gate::HashRound {
                kind: HashKind::Ultra,
                round: 0,
                input,
                output,
            });
            assert_eq!(cs.failed(), should_fail);
        }
    }

    #[test]
    fn test_ecc_gates() {
        let mut cs = composer(ComposerVariant::Standard);
        let g = GroupElement::generator();
        let two_g = (GroupProjective::from(g) + g).to_affine();

        let alloc = |cs: &mut Composer, p: &GroupElement| {
            g1_to_limbs(p).unwrap().map(|limb| cs.add_variable(limb))
        };
        let g_wires = alloc(&mut cs, &g);
        let two_g_wires = alloc(&mut cs, &two_g);
        let two = cs.add_variable(Scalar::from(2u64));

        cs.create_gate(Gate::OnCurve { point: g_wires });
        cs.create_gate(Gate::EccAdd {
            lhs: g_wires,
            rhs: g_wires,
            out: two_g_wires,
        });
        cs.create_gate(Gate::EccMul {
            base: g_wires,
            scalar: two,
            out: two_g_wires,
        });
        assert!(!cs.failed(), "{}", cs.err());

        cs.create_gate(Gate::EccAdd {
            lhs: g_wires,
            rhs: two_g_wires,
            out: two_g_wires,
        });
        assert!(cs.failed());
    }
}
