//! Structured reference string
//!
//! Powers of a secret `tau` in G1 for the prover, and `[1]_2`, `[tau]_2` with
//! their precomputed Miller-loop lines for the verifier. On disk the string is
//!
//! ```text
//! magic   b"KZGSRS01"
//! count   u32 little-endian
//! g1      count * 48-byte compressed points ([tau^i]_1)
//! g2      96-byte compressed point ([tau]_2)
//! ```

use crate::{CommitmentError, GroupElement, GroupProjective, Result, Scalar};
use bls12_381::{G2Affine, G2Prepared, G2Projective};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ff::Field;
use group::Curve;
use merlin::Transcript as MerlinTranscript;
use rand_core::RngCore;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

const SRS_MAGIC: &[u8; 8] = b"KZGSRS01";

/// Upper bound on G1 powers reserved before any are read; the count in the
/// header is untrusted
const MAX_PREALLOCATED_POWERS: usize = 1 << 16;

/// `[1]_2` and `[tau]_2` prepared for a batched Miller loop
pub struct PrecomputedG2Lines {
    /// Lines for the G2 generator
    pub one: G2Prepared,
    /// Lines for `[tau]_2`
    pub tau: G2Prepared,
}

impl fmt::Debug for PrecomputedG2Lines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrecomputedG2Lines")
    }
}

/// The verifier's half of the reference string
#[derive(Debug)]
pub struct VerifierReferenceString {
    g2_tau: G2Affine,
    lines: PrecomputedG2Lines,
}

impl VerifierReferenceString {
    /// Build the verifier string from `[tau]_2`
    pub fn new(g2_tau: G2Affine) -> Self {
        let lines = PrecomputedG2Lines {
            one: G2Prepared::from(G2Affine::generator()),
            tau: G2Prepared::from(g2_tau),
        };
        Self { g2_tau, lines }
    }

    /// `[tau]_2`
    pub fn g2_tau(&self) -> &G2Affine {
        &self.g2_tau
    }

    /// Precomputed lines for `[1]_2` and `[tau]_2`
    pub fn precomputed_g2_lines(&self) -> &PrecomputedG2Lines {
        &self.lines
    }
}

/// Powers-of-tau reference string shared by composers, provers and verifiers
#[derive(Debug)]
pub struct ReferenceString {
    g1_powers: Vec<GroupElement>,
    verifier: Arc<VerifierReferenceString>,
}

impl ReferenceString {
    /// Sample a fresh secret and build `size` G1 powers
    pub fn generate(size: usize, rng: &mut impl RngCore) -> Result<Self> {
        let tau = Scalar::random(rng);
        Self::from_secret(size, tau)
    }

    /// Deterministic reference string derived from a seed
    ///
    /// The secret is recoverable by anyone who knows the seed, so this is only
    /// suitable for tests, benchmarks and demos.
    pub fn insecure_from_seed(size: usize, seed: &[u8]) -> Result<Self> {
        let mut transcript = MerlinTranscript::new(b"kzg-reference-string");
        transcript.append_message(b"seed", seed);
        let mut buf = [0u8; 64];
        transcript.challenge_bytes(b"tau", &mut buf);
        Self::from_secret(size, Scalar::from_bytes_wide(&buf))
    }

    fn from_secret(size: usize, tau: Scalar) -> Result<Self> {
        if size == 0 {
            return Err(CommitmentError::InvalidParameters(
                "reference string must hold at least one point".to_string(),
            ));
        }
        if bool::from(tau.is_zero()) {
            return Err(CommitmentError::InvalidParameters(
                "secret must be non-zero".to_string(),
            ));
        }

        let generator = GroupProjective::generator();
        let mut projective = Vec::with_capacity(size);
        let mut power = Scalar::ONE;
        for _ in 0..size {
            projective.push(generator * power);
            power *= tau;
        }

        let mut g1_powers = vec![GroupElement::identity(); size];
        GroupProjective::batch_normalize(&projective, &mut g1_powers);

        let g2_tau = (G2Projective::generator() * tau).to_affine();
        tracing::debug!(size, "generated reference string");

        Ok(Self {
            g1_powers,
            verifier: Arc::new(VerifierReferenceString::new(g2_tau)),
        })
    }

    /// Load a reference string from a file
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            CommitmentError::Io(format!("cannot open {}: {}", path.display(), err))
        })?;
        let srs = Self::read_from(&mut BufReader::new(file))?;
        tracing::info!(path = %path.display(), size = srs.size(), "loaded reference string");
        Ok(srs)
    }

    /// Store the reference string in a file
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Decode from the on-disk format
    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if &magic != SRS_MAGIC {
            return Err(CommitmentError::InvalidEncoding(
                "not a reference string file".to_string(),
            ));
        }

        let count = reader.read_u32::<LittleEndian>()? as usize;
        if count == 0 {
            return Err(CommitmentError::InvalidEncoding(
                "reference string is empty".to_string(),
            ));
        }

        let mut g1_powers = Vec::with_capacity(count.min(MAX_PREALLOCATED_POWERS));
        let mut buf = [0u8; 48];
        for i in 0..count {
            reader.read_exact(&mut buf)?;
            let point: Option<GroupElement> = GroupElement::from_compressed(&buf).into();
            let point = point.ok_or_else(|| {
                CommitmentError::InvalidEncoding(format!("invalid G1 power at index {}", i))
            })?;
            g1_powers.push(point);
        }

        let mut g2_buf = [0u8; 96];
        reader.read_exact(&mut g2_buf)?;
        let g2_tau: Option<G2Affine> = G2Affine::from_compressed(&g2_buf).into();
        let g2_tau = g2_tau
            .ok_or_else(|| CommitmentError::InvalidEncoding("invalid [tau]_2".to_string()))?;

        Ok(Self {
            g1_powers,
            verifier: Arc::new(VerifierReferenceString::new(g2_tau)),
        })
    }

    /// Encode to the on-disk format
    pub fn write_to(&self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(SRS_MAGIC)?;
        writer.write_u32::<LittleEndian>(self.g1_powers.len() as u32)?;
        for point in &self.g1_powers {
            writer.write_all(&point.to_compressed())?;
        }
        writer.write_all(&self.verifier.g2_tau.to_compressed())?;
        Ok(())
    }

    /// Number of G1 powers
    pub fn size(&self) -> usize {
        self.g1_powers.len()
    }

    /// The first `count` G1 powers
    pub fn g1_powers(&self, count: usize) -> Result<&[GroupElement]> {
        if count > self.g1_powers.len() {
            return Err(CommitmentError::ReferenceStringTooSmall {
                required: count,
                available: self.g1_powers.len(),
            });
        }
        Ok(&self.g1_powers[..count])
    }

    /// Shared handle to the verifier half
    pub fn verifier_reference_string(&self) -> Arc<VerifierReferenceString> {
        Arc::clone(&self.verifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::pairing;
    use rand::thread_rng;

    #[test]
    fn test_generate_sizes() {
        let srs = ReferenceString::generate(8, &mut thread_rng()).unwrap();
        assert_eq!(srs.size(), 8);
        assert_eq!(srs.g1_powers(8).unwrap().len(), 8);
        assert!(matches!(
            srs.g1_powers(9),
            Err(CommitmentError::ReferenceStringTooSmall { required: 9, available: 8 })
        ));
    }

    #[test]
    fn test_powers_are_consistent_with_g2() {
        let srs = ReferenceString::insecure_from_seed(4, b"consistency").unwrap();
        let powers = srs.g1_powers(2).unwrap();
        // e([tau]_1, [1]_2) == e([1]_1, [tau]_2)
        let lhs = pairing(&powers[1], &G2Affine::generator());
        let rhs = pairing(&powers[0], srs.verifier_reference_string().g2_tau());
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = ReferenceString::insecure_from_seed(4, b"seed").unwrap();
        let b = ReferenceString::insecure_from_seed(4, b"seed").unwrap();
        let c = ReferenceString::insecure_from_seed(4, b"other").unwrap();
        assert_eq!(a.g1_powers(4).unwrap(), b.g1_powers(4).unwrap());
        assert_ne!(a.g1_powers(4).unwrap(), c.g1_powers(4).unwrap());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let srs = ReferenceString::insecure_from_seed(5, b"roundtrip").unwrap();
        let mut bytes = Vec::new();
        srs.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 8 + 4 + 5 * 48 + 96);

        let decoded = ReferenceString::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(decoded.g1_powers(5).unwrap(), srs.g1_powers(5).unwrap());
        assert_eq!(
            decoded.verifier_reference_string().g2_tau(),
            srs.verifier_reference_string().g2_tau()
        );
    }

    #[test]
    fn test_bad_magic_rejected() {
        let bytes = b"NOTANSRS\x01\x00\x00\x00".to_vec();
        assert!(matches!(
            ReferenceString::read_from(&mut bytes.as_slice()),
            Err(CommitmentError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_huge_count_without_points_rejected() {
        let bytes = b"KZGSRS01\xff\xff\xff\xff".to_vec();
        assert!(matches!(
            ReferenceString::read_from(&mut bytes.as_slice()),
            Err(CommitmentError::Io(_))
        ));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let srs = ReferenceString::insecure_from_seed(3, b"truncated").unwrap();
        let mut bytes = Vec::new();
        srs.write_to(&mut bytes).unwrap();
        for len in [12, 8 + 4 + 48 + 10, bytes.len() - 1] {
            assert!(matches!(
                ReferenceString::read_from(&mut &bytes[..len]),
                Err(CommitmentError::Io(_))
            ));
        }
    }

    #[test]
    fn test_missing_file() {
        let result = ReferenceString::read_from_path("/nonexistent/srs.bin");
        assert!(matches!(result, Err(CommitmentError::Io(_))));
    }
}
