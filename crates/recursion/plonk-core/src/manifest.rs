//! Transcript manifest
//!
//! The manifest is the schedule of what is hashed in which order and which
//! challenge each round produces. The prover, the native verifier and the
//! in-circuit verifier all drive their transcripts through a
//! [`ManifestCursor`], so a deviation from the schedule is an error rather
//! than a silent challenge mismatch.
//!
//! | round | elements | challenge |
//! |---|---|---|
//! | 1 | `circuit_size`, `public_input_count`, `public_inputs`, `W_1`, `W_2`, `W_3` | `beta` (2: beta, gamma) |
//! | 2 | `Z_PERM` | `alpha` |
//! | 3 | `T_LO`, `T_MID`, `T_HI` | `zeta` |
//! | 4 | the sixteen evaluations, see [`EVALUATION_LABELS`] | `nu` |
//! | 5 | `PI_Z`, `PI_Z_OMEGA` | `separator` |

use crate::{PlonkError, Result};

/// Labels of the evaluations sent in round 4, in order
pub const EVALUATION_LABELS: [&str; 16] = [
    "w_1", "w_2", "w_3", "sigma_1", "sigma_2", "sigma_3", "q_m", "q_1", "q_2", "q_3", "q_c", "z",
    "t_lo", "t_mid", "t_hi", "z_omega",
];

/// Shape of a transcript element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A single scalar
    Scalar,
    /// A G1 point, absorbed as four limbs
    Point,
}

/// One named element of a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: &'static str,
    pub kind: ElementKind,
    /// Number of elements of `kind` under this name
    pub count: usize,
}

/// Elements absorbed before a challenge is squeezed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundManifest {
    pub elements: Vec<ManifestEntry>,
    pub challenge: &'static str,
    pub num_challenges: usize,
}

/// Full transcript schedule for a given number of public inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    rounds: Vec<RoundManifest>,
    num_public_inputs: usize,
}

fn scalar(name: &'static str) -> ManifestEntry {
    ManifestEntry {
        name,
        kind: ElementKind::Scalar,
        count: 1,
    }
}

fn point(name: &'static str) -> ManifestEntry {
    ManifestEntry {
        name,
        kind: ElementKind::Point,
        count: 1,
    }
}

impl Manifest {
    /// The standard schedule
    pub fn create(num_public_inputs: usize) -> Self {
        let rounds = vec![
            RoundManifest {
                elements: vec![
                    scalar("circuit_size"),
                    scalar("public_input_count"),
                    ManifestEntry {
                        name: "public_inputs",
                        kind: ElementKind::Scalar,
                        count: num_public_inputs,
                    },
                    point("W_1"),
                    point("W_2"),
                    point("W_3"),
                ],
                challenge: "beta",
                num_challenges: 2,
            },
            RoundManifest {
                elements: vec![point("Z_PERM")],
                challenge: "alpha",
                num_challenges: 1,
            },
            RoundManifest {
                elements: vec![point("T_LO"), point("T_MID"), point("T_HI")],
                challenge: "zeta",
                num_challenges: 1,
            },
            RoundManifest {
                elements: EVALUATION_LABELS.into_iter().map(scalar).collect(),
                challenge: "nu",
                num_challenges: 1,
            },
            RoundManifest {
                elements: vec![point("PI_Z"), point("PI_Z_OMEGA")],
                challenge: "separator",
                num_challenges: 1,
            },
        ];

        Self {
            rounds,
            num_public_inputs,
        }
    }

    pub fn rounds(&self) -> &[RoundManifest] {
        &self.rounds
    }

    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn num_public_inputs(&self) -> usize {
        self.num_public_inputs
    }

    /// Cursor positioned at the first element of the first round
    pub fn cursor(&self) -> ManifestCursor {
        ManifestCursor {
            manifest: self.clone(),
            round: 0,
            element: 0,
        }
    }
}

/// Position within a manifest
#[derive(Debug, Clone)]
pub struct ManifestCursor {
    manifest: Manifest,
    round: usize,
    element: usize,
}

impl ManifestCursor {
    /// Check that the next element is `name` with the given shape, then advance
    pub fn next_element(&mut self, name: &str, kind: ElementKind, count: usize) -> Result<()> {
        let round = self.current_round()?;
        let expected = round.elements.get(self.element).ok_or_else(|| {
            PlonkError::Transcript(format!(
                "round {} expects challenge '{}', got element '{}'",
                self.round + 1,
                round.challenge,
                name
            ))
        })?;

        if expected.name != name || expected.kind != kind || expected.count != count {
            return Err(PlonkError::Transcript(format!(
                "round {} expects {:?} x{} '{}', got {:?} x{} '{}'",
                self.round + 1,
                expected.kind,
                expected.count,
                expected.name,
                kind,
                count,
                name
            )));
        }

        self.element += 1;
        Ok(())
    }

    /// Close the current round, returning how many challenges it produces
    pub fn end_round(&mut self, challenge: &str) -> Result<usize> {
        let round = self.current_round()?;
        if self.element != round.elements.len() {
            return Err(PlonkError::Transcript(format!(
                "challenge '{}' requested with {} of {} elements of round {}",
                challenge,
                self.element,
                round.elements.len(),
                self.round + 1
            )));
        }
        if round.challenge != challenge {
            return Err(PlonkError::Transcript(format!(
                "round {} produces '{}', not '{}'",
                self.round + 1,
                round.challenge,
                challenge
            )));
        }

        let count = round.num_challenges;
        self.round += 1;
        self.element = 0;
        Ok(count)
    }

    /// Whether every round has been closed
    pub fn is_complete(&self) -> bool {
        self.round == self.manifest.rounds.len()
    }

    fn current_round(&self) -> Result<&RoundManifest> {
        self.manifest
            .rounds
            .get(self.round)
            .ok_or_else(|| PlonkError::Transcript("manifest already complete".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_shape() {
        let manifest = Manifest::create(2);
        assert_eq!(manifest.num_rounds(), 5);
        assert_eq!(manifest.rounds()[0].elements[2].count, 2);
        assert_eq!(manifest.rounds()[0].num_challenges, 2);
        assert_eq!(manifest.rounds()[3].elements.len(), 16);
        assert_eq!(manifest, Manifest::create(2));
        assert_ne!(manifest, Manifest::create(3));
    }

    #[test]
    fn test_cursor_follows_schedule() {
        let manifest = Manifest::create(1);
        let mut cursor = manifest.cursor();
        cursor.next_element("circuit_size", ElementKind::Scalar, 1).unwrap();
        cursor.next_element("public_input_count", ElementKind::Scalar, 1).unwrap();
        cursor.next_element("public_inputs", ElementKind::Scalar, 1).unwrap();
        for name in ["W_1", "W_2", "W_3"] {
            cursor.next_element(name, ElementKind::Point, 1).unwrap();
        }
        assert_eq!(cursor.end_round("beta").unwrap(), 2);
        assert!(!cursor.is_complete());
    }

    #[test]
    fn test_cursor_rejects_out_of_order() {
        let manifest = Manifest::create(0);
        let mut cursor = manifest.cursor();
        assert!(cursor.next_element("W_1", ElementKind::Point, 1).is_err());
        assert!(cursor.end_round("beta").is_err());

        cursor.next_element("circuit_size", ElementKind::Scalar, 1).unwrap();
        assert!(cursor
            .next_element("public_input_count", ElementKind::Point, 1)
            .is_err());
    }

    #[test]
    fn test_cursor_rejects_wrong_public_input_count() {
        let manifest = Manifest::create(2);
        let mut cursor = manifest.cursor();
        cursor.next_element("circuit_size", ElementKind::Scalar, 1).unwrap();
        cursor.next_element("public_input_count", ElementKind::Scalar, 1).unwrap();
        assert!(cursor.next_element("public_inputs", ElementKind::Scalar, 3).is_err());
    }
}
