//! Algebraic sponge used for Fiat-Shamir
//!
//! The sponge works directly over the scalar field so the same hash can be
//! evaluated natively and replayed inside a circuit. Two flavours exist:
//! [`HashKind::Standard`] and [`HashKind::Ultra`]. They differ in round count,
//! round constants and domain tag, so a transcript hashed with one never agrees
//! with a transcript hashed with the other.
//!
//! The permutation has width 3 and rate 2. Each round adds the round constants,
//! raises every element to the fifth power and mixes with the MDS matrix
//! `[[2, 1, 1], [1, 2, 1], [1, 1, 2]]`.

use crate::Scalar;
use ff::Field;
use merlin::Transcript as MerlinTranscript;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Sponge state width
pub const WIDTH: usize = 3;

/// Number of state elements absorbed per permutation
pub const RATE: usize = 2;

/// Which flavour of the transcript hash to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashKind {
    /// Hash natively available to every composer variant
    Standard,
    /// Hash with a dedicated permutation-round gate
    Ultra,
}

impl HashKind {
    /// Number of permutation rounds
    pub fn num_rounds(&self) -> usize {
        match self {
            HashKind::Standard => 24,
            HashKind::Ultra => 16,
        }
    }

    /// Initial value of the capacity element
    pub fn domain_tag(&self) -> Scalar {
        match self {
            HashKind::Standard => Scalar::from(1u64),
            HashKind::Ultra => Scalar::from(2u64),
        }
    }

    fn label(&self) -> &'static [u8] {
        match self {
            HashKind::Standard => b"standard",
            HashKind::Ultra => b"ultra",
        }
    }
}

static STANDARD_CONSTANTS: OnceLock<Vec<[Scalar; WIDTH]>> = OnceLock::new();
static ULTRA_CONSTANTS: OnceLock<Vec<[Scalar; WIDTH]>> = OnceLock::new();

/// Round constants for the given flavour, one row per round
pub fn round_constants(kind: HashKind) -> &'static [[Scalar; WIDTH]] {
    let cell = match kind {
        HashKind::Standard => &STANDARD_CONSTANTS,
        HashKind::Ultra => &ULTRA_CONSTANTS,
    };
    cell.get_or_init(|| derive_round_constants(kind))
}

fn derive_round_constants(kind: HashKind) -> Vec<[Scalar; WIDTH]> {
    let mut transcript = MerlinTranscript::new(b"transcript-hash-constants");
    transcript.append_message(b"kind", kind.label());

    let mut buf = [0u8; 64];
    (0..kind.num_rounds())
        .map(|_| {
            let mut row = [Scalar::ZERO; WIDTH];
            for constant in row.iter_mut() {
                transcript.challenge_bytes(b"round-constant", &mut buf);
                *constant = Scalar::from_bytes_wide(&buf);
            }
            row
        })
        .collect()
}

/// Apply a single permutation round in place
pub fn permute_round(kind: HashKind, round: usize, state: &mut [Scalar; WIDTH]) {
    let constants = &round_constants(kind)[round];
    for (element, constant) in state.iter_mut().zip(constants.iter()) {
        let x = *element + constant;
        *element = x.square().square() * x;
    }

    let sum = state[0] + state[1] + state[2];
    for element in state.iter_mut() {
        *element += sum;
    }
}

/// Apply the full permutation in place
pub fn permute(kind: HashKind, state: &mut [Scalar; WIDTH]) {
    for round in 0..kind.num_rounds() {
        permute_round(kind, round, state);
    }
}

/// Duplex sponge over the scalar field
#[derive(Debug, Clone)]
pub struct Sponge {
    kind: HashKind,
    state: [Scalar; WIDTH],
    absorbed: usize,
}

impl Sponge {
    /// Fresh sponge for the given flavour
    pub fn new(kind: HashKind) -> Self {
        Self {
            kind,
            state: [Scalar::ZERO, Scalar::ZERO, kind.domain_tag()],
            absorbed: 0,
        }
    }

    /// The flavour this sponge hashes with
    pub fn kind(&self) -> HashKind {
        self.kind
    }

    /// Absorb one field element
    pub fn absorb(&mut self, value: &Scalar) {
        if self.absorbed == RATE {
            permute(self.kind, &mut self.state);
            self.absorbed = 0;
        }
        self.state[self.absorbed] += value;
        self.absorbed += 1;
    }

    /// Squeeze one field element
    pub fn squeeze(&mut self) -> Scalar {
        permute(self.kind, &mut self.state);
        self.absorbed = 0;
        self.state[0]
    }

    /// Hash a sequence of elements to a single element
    pub fn hash(kind: HashKind, inputs: &[Scalar]) -> Scalar {
        let mut sponge = Self::new(kind);
        for input in inputs {
            sponge.absorb(input);
        }
        sponge.squeeze()
    }
}
