//! Proving key and witness layout
//!
//! Row layout over the domain of size `n`:
//!
//! - one row per public input, `w_1 = pi`, `q_1 = 1`, cancelled by the
//!   public-input polynomial
//! - one row per wire of every deferred gate, laid out like a public input
//! - one row per arithmetic gate, in insertion order
//! - padding rows with zero selectors, wired to the zero variable
//!
//! Hash-round and curve gates have no selector polynomial. They are
//! deferred: their wires become trailing public inputs of the proof, and the
//! verifier re-checks each gate on those values. The copy constraints of the
//! exposed rows tie the values to the rest of the circuit.
//!
//! Copy constraints are encoded by the permutation polynomials `sigma_j`.
//! Wire `j` at row `i` is identified with `K_j * omega^i`, where `K_j` are the
//! [`COSET_GENERATORS`].

use crate::polynomial::{DensePolynomial, Domain};
use crate::{PlonkError, Result, Scalar};
use commitments::{CommitmentError, ReferenceString};
use ff::Field;
use plonk_arith::{Composer, Gate};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Coset representatives separating the three wire columns
pub const COSET_GENERATORS: [u64; 3] = [1, 7, 49];

/// Minimum domain size
const MIN_CIRCUIT_SIZE: usize = 4;

/// `K_j` as field elements
pub fn coset_generators() -> [Scalar; 3] {
    COSET_GENERATORS.map(Scalar::from)
}

struct Row {
    wires: [u32; 3],
    selectors: [Scalar; 5],
}

/// Preprocessed circuit polynomials
#[derive(Debug, Clone)]
pub struct ProvingKey {
    pub circuit_size: usize,
    /// Declared public inputs followed by the deferred-gate wires
    pub num_public_inputs: usize,
    /// Non-arithmetic gates, rewired onto positions in the deferred values
    pub deferred_gates: Vec<Gate>,
    pub num_deferred_values: usize,
    pub domain: Domain,
    pub q_m: DensePolynomial,
    pub q_1: DensePolynomial,
    pub q_2: DensePolynomial,
    pub q_3: DensePolynomial,
    pub q_c: DensePolynomial,
    pub sigma: [DensePolynomial; 3],
    /// `sigma_j(omega^i)`, used by the grand product
    pub sigma_evals: [Vec<Scalar>; 3],
    /// Variable index on each wire of each row
    pub wire_indices: [Vec<u32>; 3],
    pub reference_string: Arc<ReferenceString>,
}

/// Wire values of one satisfying assignment
#[derive(Debug, Clone, PartialEq)]
pub struct Witness {
    pub wires: [Vec<Scalar>; 3],
    pub public_inputs: Vec<Scalar>,
}

impl ProvingKey {
    /// Preprocess a finalized composer
    pub fn compute(composer: &Composer) -> Result<Self> {
        if !composer.is_finalized() {
            return Err(PlonkError::InvalidCircuit(
                "proving key requires a finalized composer".to_string(),
            ));
        }

        let (deferred_gates, exposed) = defer_gates(composer.gates());
        let num_public_inputs = composer.num_public_inputs() + exposed.len();

        let zero = composer.zero_idx();
        let mut rows = Vec::with_capacity(num_public_inputs + composer.num_gates());
        for index in composer.public_inputs().iter().chain(exposed.iter()) {
            rows.push(Row {
                wires: [*index, zero, zero],
                selectors: [Scalar::ZERO, Scalar::ONE, Scalar::ZERO, Scalar::ZERO, Scalar::ZERO],
            });
        }
        for gate in composer.gates() {
            if let Gate::Arithmetic(g) = gate {
                rows.push(Row {
                    wires: [g.a, g.b, g.c],
                    selectors: [g.q_m, g.q_l, g.q_r, g.q_o, g.q_c],
                });
            }
        }

        let n = rows.len().max(MIN_CIRCUIT_SIZE).next_power_of_two();
        let reference_string = composer.reference_string().clone();
        if reference_string.size() < n {
            return Err(CommitmentError::ReferenceStringTooSmall {
                required: n,
                available: reference_string.size(),
            }
            .into());
        }
        let domain = Domain::new(n)?;

        let mut wire_indices = [vec![zero; n], vec![zero; n], vec![zero; n]];
        let mut selectors = [
            vec![Scalar::ZERO; n],
            vec![Scalar::ZERO; n],
            vec![Scalar::ZERO; n],
            vec![Scalar::ZERO; n],
            vec![Scalar::ZERO; n],
        ];
        for (i, row) in rows.iter().enumerate() {
            for j in 0..3 {
                wire_indices[j][i] = row.wires[j];
            }
            for k in 0..5 {
                selectors[k][i] = row.selectors[k];
            }
        }

        let sigma_evals = compute_sigma_evals(composer, &domain, &wire_indices);
        let sigma = [
            DensePolynomial::from_evaluations(&domain, &sigma_evals[0])?,
            DensePolynomial::from_evaluations(&domain, &sigma_evals[1])?,
            DensePolynomial::from_evaluations(&domain, &sigma_evals[2])?,
        ];
        let [q_m, q_1, q_2, q_3, q_c] = selectors;

        tracing::debug!(
            circuit_size = n,
            rows = rows.len(),
            public_inputs = composer.num_public_inputs(),
            deferred_gates = deferred_gates.len(),
            "proving key computed"
        );

        Ok(Self {
            circuit_size: n,
            num_public_inputs,
            deferred_gates,
            num_deferred_values: exposed.len(),
            domain,
            q_m: DensePolynomial::from_evaluations(&domain, &q_m)?,
            q_1: DensePolynomial::from_evaluations(&domain, &q_1)?,
            q_2: DensePolynomial::from_evaluations(&domain, &q_2)?,
            q_3: DensePolynomial::from_evaluations(&domain, &q_3)?,
            q_c: DensePolynomial::from_evaluations(&domain, &q_c)?,
            sigma,
            sigma_evals,
            wire_indices,
            reference_string,
        })
    }

    /// Selector polynomials in `q_m, q_1, q_2, q_3, q_c` order
    pub fn selectors(&self) -> [&DensePolynomial; 5] {
        [&self.q_m, &self.q_1, &self.q_2, &self.q_3, &self.q_c]
    }

    /// Number of public inputs declared by the circuit itself
    pub fn num_declared_public_inputs(&self) -> usize {
        self.num_public_inputs - self.num_deferred_values
    }

    /// Read the wire values of `composer` through this key's layout
    pub fn witness(&self, composer: &Composer) -> Result<Witness> {
        if composer.num_public_inputs() != self.num_declared_public_inputs() {
            return Err(PlonkError::InvalidCircuit(format!(
                "key expects {} public inputs, composer has {}",
                self.num_declared_public_inputs(),
                composer.num_public_inputs()
            )));
        }
        let num_variables = composer.num_variables() as u32;
        if self
            .wire_indices
            .iter()
            .flatten()
            .any(|index| *index >= num_variables)
        {
            return Err(PlonkError::InvalidCircuit(
                "composer does not match the proving key".to_string(),
            ));
        }

        let read = |column: &Vec<u32>| -> Vec<Scalar> {
            column.iter().map(|index| composer.get_variable(*index)).collect()
        };
        let wires = [
            read(&self.wire_indices[0]),
            read(&self.wire_indices[1]),
            read(&self.wire_indices[2]),
        ];
        let public_inputs = wires[0][..self.num_public_inputs].to_vec();
        Ok(Witness {
            wires,
            public_inputs,
        })
    }
}

/// Split off the gates without selectors
///
/// Returns those gates rewired onto consecutive positions, and the variable
/// exposed at each position.
fn defer_gates(gates: &[Gate]) -> (Vec<Gate>, Vec<u32>) {
    let mut deferred = Vec::new();
    let mut exposed = Vec::new();
    for gate in gates.iter().filter(|gate| !gate.is_arithmetic()) {
        deferred.push(gate.map_wires(|wire| {
            exposed.push(wire);
            (exposed.len() - 1) as u32
        }));
    }
    (deferred, exposed)
}

/// Each wire position points to the next position of its copy class
fn compute_sigma_evals(
    composer: &Composer,
    domain: &Domain,
    wire_indices: &[Vec<u32>; 3],
) -> [Vec<Scalar>; 3] {
    let n = domain.size();
    let elements = domain.elements();
    let k = coset_generators();

    let mut cycles: BTreeMap<u32, Vec<(usize, usize)>> = BTreeMap::new();
    for (j, column) in wire_indices.iter().enumerate() {
        for (i, index) in column.iter().enumerate() {
            cycles
                .entry(composer.real_variable_index(*index))
                .or_default()
                .push((j, i));
        }
    }

    let mut sigma = [vec![Scalar::ZERO; n], vec![Scalar::ZERO; n], vec![Scalar::ZERO; n]];
    for positions in cycles.values() {
        for (m, (j, i)) in positions.iter().enumerate() {
            let (next_j, next_i) = positions[(m + 1) % positions.len()];
            sigma[*j][*i] = k[next_j] * elements[next_i];
        }
    }
    sigma
}
