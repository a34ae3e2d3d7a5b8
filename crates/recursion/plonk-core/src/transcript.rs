//! Native Fiat-Shamir transcript driven by a [`Manifest`]

use crate::manifest::{ElementKind, Manifest, ManifestCursor};
use crate::{GroupElement, Result, Scalar};
use commitments::{g1_to_limbs, HashKind, Sponge};

/// Prover/verifier transcript over the algebraic sponge
#[derive(Debug, Clone)]
pub struct Transcript {
    sponge: Sponge,
    cursor: ManifestCursor,
}

impl Transcript {
    pub fn new(manifest: &Manifest, kind: HashKind) -> Self {
        Self {
            sponge: Sponge::new(kind),
            cursor: manifest.cursor(),
        }
    }

    pub fn hash_kind(&self) -> HashKind {
        self.sponge.kind()
    }

    /// Append a single scalar
    pub fn send_scalar(&mut self, name: &str, value: &Scalar) -> Result<()> {
        self.send_scalars(name, std::slice::from_ref(value))
    }

    /// Append a sequence of scalars under one name
    pub fn send_scalars(&mut self, name: &str, values: &[Scalar]) -> Result<()> {
        self.cursor
            .next_element(name, ElementKind::Scalar, values.len())?;
        for value in values {
            self.sponge.absorb(value);
        }
        Ok(())
    }

    /// Append a point as its four limbs; the identity is rejected
    pub fn send_point(&mut self, name: &str, point: &GroupElement) -> Result<()> {
        self.cursor.next_element(name, ElementKind::Point, 1)?;
        for limb in g1_to_limbs(point)?.iter() {
            self.sponge.absorb(limb);
        }
        Ok(())
    }

    /// Close the round and squeeze its challenges
    pub fn apply_fiat_shamir(&mut self, challenge: &str) -> Result<Vec<Scalar>> {
        let count = self.cursor.end_round(challenge)?;
        Ok((0..count).map(|_| self.sponge.squeeze()).collect())
    }

    /// Close a round producing exactly one challenge
    pub fn get_challenge(&mut self, challenge: &str) -> Result<Scalar> {
        let challenges = self.apply_fiat_shamir(challenge)?;
        challenges.first().copied().ok_or_else(|| {
            crate::PlonkError::Transcript(format!("round '{}' has no challenge", challenge))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlonkError;

    fn first_round(transcript: &mut Transcript, points: &[GroupElement; 3]) -> Result<Vec<Scalar>> {
        transcript.send_scalar("circuit_size", &Scalar::from(8u64))?;
        transcript.send_scalar("public_input_count", &Scalar::from(1u64))?;
        transcript.send_scalars("public_inputs", &[Scalar::from(7u64)])?;
        for (name, point) in ["W_1", "W_2", "W_3"].iter().zip(points.iter()) {
            transcript.send_point(name, point)?;
        }
        transcript.apply_fiat_shamir("beta")
    }

    #[test]
    fn test_challenges_are_reproducible() {
        let manifest = Manifest::create(1);
        let points = [GroupElement::generator(); 3];
        let mut a = Transcript::new(&manifest, HashKind::Standard);
        let mut b = Transcript::new(&manifest, HashKind::Standard);
        let ca = first_round(&mut a, &points).unwrap();
        let cb = first_round(&mut b, &points).unwrap();
        assert_eq!(ca.len(), 2);
        assert_eq!(ca, cb);
        assert_ne!(ca[0], ca[1]);
    }

    #[test]
    fn test_hash_kinds_diverge() {
        let manifest = Manifest::create(1);
        let points = [GroupElement::generator(); 3];
        let mut standard = Transcript::new(&manifest, HashKind::Standard);
        let mut ultra = Transcript::new(&manifest, HashKind::Ultra);
        assert_ne!(
            first_round(&mut standard, &points).unwrap(),
            first_round(&mut ultra, &points).unwrap()
        );
    }

    #[test]
    fn test_identity_point_rejected() {
        let manifest = Manifest::create(1);
        let points = [
            GroupElement::generator(),
            GroupElement::identity(),
            GroupElement::generator(),
        ];
        let mut transcript = Transcript::new(&manifest, HashKind::Ultra);
        assert!(matches!(
            first_round(&mut transcript, &points),
            Err(PlonkError::Commitment(_))
        ));
    }
}
