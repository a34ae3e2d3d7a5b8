//! Transcript replayed with outer-circuit gates
//!
//! Follows the same [`Manifest`] as the native prover and verifier and uses
//! [`CircuitSponge`], so every challenge equals its native counterpart.

use crate::{RecursionError, Result};
use commitments::HashKind;
use plonk_arith::{CircuitSponge, Composer, FieldVar, G1Var};
use plonk_core::manifest::{ElementKind, ManifestCursor};
use plonk_core::{Manifest, PlonkError};

/// In-circuit Fiat-Shamir transcript
#[derive(Debug, Clone)]
pub struct CircuitTranscript {
    sponge: CircuitSponge,
    cursor: ManifestCursor,
}

fn transcript_error(err: PlonkError) -> RecursionError {
    RecursionError::Transcript(err.to_string())
}

impl CircuitTranscript {
    /// Fails if `composer` cannot evaluate `kind`
    pub fn new(composer: &Composer, manifest: &Manifest, kind: HashKind) -> Result<Self> {
        Ok(Self {
            sponge: CircuitSponge::new(composer, kind)?,
            cursor: manifest.cursor(),
        })
    }

    pub fn send_scalar(&mut self, cs: &mut Composer, name: &str, value: &FieldVar) -> Result<()> {
        self.send_scalars(cs, name, std::slice::from_ref(value))
    }

    pub fn send_scalars(&mut self, cs: &mut Composer, name: &str, values: &[FieldVar]) -> Result<()> {
        self.cursor
            .next_element(name, ElementKind::Scalar, values.len())
            .map_err(transcript_error)?;
        for value in values {
            self.sponge.absorb(cs, value);
        }
        Ok(())
    }

    /// Absorb the four limbs of a point
    pub fn send_point(&mut self, cs: &mut Composer, name: &str, point: &G1Var) -> Result<()> {
        self.cursor
            .next_element(name, ElementKind::Point, 1)
            .map_err(transcript_error)?;
        for limb in point.limbs() {
            self.sponge.absorb(cs, limb);
        }
        Ok(())
    }

    pub fn apply_fiat_shamir(&mut self, cs: &mut Composer, challenge: &str) -> Result<Vec<FieldVar>> {
        let count = self.cursor.end_round(challenge).map_err(transcript_error)?;
        Ok((0..count).map(|_| self.sponge.squeeze(cs)).collect())
    }

    pub fn get_challenge(&mut self, cs: &mut Composer, challenge: &str) -> Result<FieldVar> {
        self.apply_fiat_shamir(cs, challenge)?
            .first()
            .copied()
            .ok_or_else(|| RecursionError::Transcript(format!("round '{}' has no challenge", challenge)))
    }

    pub fn is_complete(&self) -> bool {
        self.cursor.is_complete()
    }
}
