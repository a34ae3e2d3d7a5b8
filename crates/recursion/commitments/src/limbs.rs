//! Four-limb encoding of G1 points
//!
//! A base-field coordinate of BLS12-381 is 381 bits and does not fit in a
//! scalar-field element, so transcripts and circuits carry each coordinate as
//! two 192-bit limbs of its big-endian encoding. A point is the ordered tuple
//! `(x_lo, x_hi, y_lo, y_hi)`. The point at infinity has no limb encoding.

use crate::{CommitmentError, GroupElement, Result, Scalar};
use byteorder::{BigEndian, ByteOrder};
use subtle::CtOption;

/// Width of a single coordinate limb
pub const LIMB_BITS: usize = 192;

/// Number of scalar-field limbs used to encode one affine point
pub const NUM_LIMBS_PER_POINT: usize = 4;

const LIMB_BYTES: usize = LIMB_BITS / 8;
const COORDINATE_BYTES: usize = 48;

/// Split an affine point into `[x_lo, x_hi, y_lo, y_hi]`
pub fn g1_to_limbs(point: &GroupElement) -> Result<[Scalar; NUM_LIMBS_PER_POINT]> {
    if bool::from(point.is_identity()) {
        return Err(CommitmentError::DegenerateCommitment(
            "point at infinity has no limb encoding".to_string(),
        ));
    }

    let bytes = point.to_uncompressed();
    let (x, y) = bytes.split_at(COORDINATE_BYTES);

    Ok([
        limb_from_be(&x[LIMB_BYTES..]),
        limb_from_be(&x[..LIMB_BYTES]),
        limb_from_be(&y[LIMB_BYTES..]),
        limb_from_be(&y[..LIMB_BYTES]),
    ])
}

/// Rebuild an affine point from `[x_lo, x_hi, y_lo, y_hi]`
///
/// Fails if a limb exceeds [`LIMB_BITS`], if the coordinates are not a point of
/// the prime-order subgroup, or if they encode the point at infinity.
pub fn g1_from_limbs(limbs: &[Scalar; NUM_LIMBS_PER_POINT]) -> Result<GroupElement> {
    let mut bytes = [0u8; 2 * COORDINATE_BYTES];
    limb_to_be(&limbs[1], &mut bytes[0..LIMB_BYTES])?;
    limb_to_be(&limbs[0], &mut bytes[LIMB_BYTES..COORDINATE_BYTES])?;
    limb_to_be(&limbs[3], &mut bytes[COORDINATE_BYTES..COORDINATE_BYTES + LIMB_BYTES])?;
    limb_to_be(&limbs[2], &mut bytes[COORDINATE_BYTES + LIMB_BYTES..])?;

    let point = decode(GroupElement::from_uncompressed(&bytes)).ok_or_else(|| {
        CommitmentError::InvalidEncoding("limbs do not encode a G1 subgroup point".to_string())
    })?;

    if bool::from(point.is_identity()) {
        return Err(CommitmentError::DegenerateCommitment(
            "limbs encode the point at infinity".to_string(),
        ));
    }

    Ok(point)
}

fn decode<T>(value: CtOption<T>) -> Option<T> {
    value.into()
}

/// 24 big-endian bytes, most significant word first
fn limb_from_be(bytes: &[u8]) -> Scalar {
    Scalar::from_raw([
        BigEndian::read_u64(&bytes[16..24]),
        BigEndian::read_u64(&bytes[8..16]),
        BigEndian::read_u64(&bytes[0..8]),
        0,
    ])
}

fn limb_to_be(limb: &Scalar, out: &mut [u8]) -> Result<()> {
    let le = limb.to_bytes();
    if le[LIMB_BYTES..].iter().any(|byte| *byte != 0) {
        return Err(CommitmentError::InvalidEncoding(format!(
            "limb exceeds {} bits",
            LIMB_BITS
        )));
    }

    for (i, byte) in le[..LIMB_BYTES].iter().enumerate() {
        out[LIMB_BYTES - 1 - i] = *byte;
    }
    Ok(())
}
