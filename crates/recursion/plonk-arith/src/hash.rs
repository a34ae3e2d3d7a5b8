//! In-circuit transcript sponge
//!
//! Mirrors [`commitments::Sponge`] absorb for absorb and squeeze for squeeze,
//! so a circuit replaying a transcript derives the same challenges as the
//! native prover. Ultra composers constrain each permutation round with one
//! hash-round gate. Standard composers expand the round into arithmetic gates,
//! which is only possible for the standard hash.

use crate::gates::Gate;
use crate::{ArithError, Composer, FieldVar, Result};
use commitments::transcript::{permute_round, round_constants, RATE, WIDTH};
use commitments::HashKind;
use ff::Field;

/// Duplex sponge over circuit field elements
#[derive(Debug, Clone)]
pub struct CircuitSponge {
    kind: HashKind,
    state: [FieldVar; WIDTH],
    absorbed: usize,
}

impl CircuitSponge {
    /// Fresh sponge; fails if the composer cannot evaluate `kind`
    pub fn new(cs: &Composer, kind: HashKind) -> Result<Self> {
        if !cs.variant().supports_hash(kind) {
            return Err(ArithError::UnsupportedHash {
                kind,
                variant: cs.variant(),
            });
        }

        Ok(Self {
            kind,
            state: [
                FieldVar::constant(commitments::Scalar::ZERO),
                FieldVar::constant(commitments::Scalar::ZERO),
                FieldVar::constant(kind.domain_tag()),
            ],
            absorbed: 0,
        })
    }

    pub fn kind(&self) -> HashKind {
        self.kind
    }

    /// Absorb one field element
    pub fn absorb(&mut self, cs: &mut Composer, value: &FieldVar) {
        if self.absorbed == RATE {
            self.permute(cs);
            self.absorbed = 0;
        }
        self.state[self.absorbed] = self.state[self.absorbed].add(cs, value);
        self.absorbed += 1;
    }

    /// Squeeze one field element
    pub fn squeeze(&mut self, cs: &mut Composer) -> FieldVar {
        self.permute(cs);
        self.absorbed = 0;
        self.state[0]
    }

    fn permute(&mut self, cs: &mut Composer) {
        for round in 0..self.kind.num_rounds() {
            if cs.variant().has_hash_round_gate() {
                self.round_with_gate(cs, round);
            } else {
                self.round_with_arithmetic(cs, round);
            }
        }
    }

    fn round_with_gate(&mut self, cs: &mut Composer, round: usize) {
        let input = self.state.map(|element| element.normalize(cs));
        let mut values = self.state.map(|element| element.value());
        permute_round(self.kind, round, &mut values);

        let output = values.map(|value| FieldVar::from_witness(cs, value));
        let output_wires = output.map(|element| element.normalize(cs));
        cs.create_gate(Gate::HashRound {
            kind: self.kind,
            round,
            input,
            output: output_wires,
        });
        self.state = output;
    }

    fn round_with_arithmetic(&mut self, cs: &mut Composer, round: usize) {
        let constants = &round_constants(self.kind)[round];
        for (element, constant) in self.state.iter_mut().zip(constants.iter()) {
            let x = element.add_constant(cs, *constant);
            let x4 = x.square(cs).square(cs);
            *element = x4.mul(cs, &x);
        }

        let sum = self.state[0].add(cs, &self.state[1]).add(cs, &self.state[2]);
        for element in self.state.iter_mut() {
            *element = element.add(cs, &sum);
        }
    }
}
