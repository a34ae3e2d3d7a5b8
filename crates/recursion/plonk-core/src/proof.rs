//! Proof structure and its byte encoding

use crate::manifest::EVALUATION_LABELS;
use crate::{GroupElement, PlonkError, Result, Scalar};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Read;

const SCALAR_BYTES: usize = 32;
const POINT_BYTES: usize = 48;

/// Polynomial evaluations sent in round 4
///
/// Every field except `z_omega` is evaluated at `zeta`; `z_omega` is
/// `z(zeta * omega)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluations {
    pub w_1: Scalar,
    pub w_2: Scalar,
    pub w_3: Scalar,
    pub sigma_1: Scalar,
    pub sigma_2: Scalar,
    pub sigma_3: Scalar,
    pub q_m: Scalar,
    pub q_1: Scalar,
    pub q_2: Scalar,
    pub q_3: Scalar,
    pub q_c: Scalar,
    pub z: Scalar,
    pub t_lo: Scalar,
    pub t_mid: Scalar,
    pub t_hi: Scalar,
    pub z_omega: Scalar,
}

impl Evaluations {
    /// Values in transcript order, see [`EVALUATION_LABELS`]
    pub fn to_array(&self) -> [Scalar; 16] {
        [
            self.w_1,
            self.w_2,
            self.w_3,
            self.sigma_1,
            self.sigma_2,
            self.sigma_3,
            self.q_m,
            self.q_1,
            self.q_2,
            self.q_3,
            self.q_c,
            self.z,
            self.t_lo,
            self.t_mid,
            self.t_hi,
            self.z_omega,
        ]
    }

    pub fn from_array(values: [Scalar; 16]) -> Self {
        let [w_1, w_2, w_3, sigma_1, sigma_2, sigma_3, q_m, q_1, q_2, q_3, q_c, z, t_lo, t_mid, t_hi, z_omega] =
            values;
        Self {
            w_1,
            w_2,
            w_3,
            sigma_1,
            sigma_2,
            sigma_3,
            q_m,
            q_1,
            q_2,
            q_3,
            q_c,
            z,
            t_lo,
            t_mid,
            t_hi,
            z_omega,
        }
    }

    /// `(label, value)` pairs in transcript order
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, Scalar)> {
        EVALUATION_LABELS.into_iter().zip(self.to_array())
    }
}

/// A PLONK proof
#[derive(Debug, Clone, PartialEq)]
pub struct Proof {
    pub public_inputs: Vec<Scalar>,
    /// Wire commitments `W_1, W_2, W_3`
    pub w: [GroupElement; 3],
    /// Permutation grand-product commitment
    pub z: GroupElement,
    /// Quotient chunks `T_LO, T_MID, T_HI`
    pub t: [GroupElement; 3],
    pub evaluations: Evaluations,
    /// Batched opening witness at `zeta`
    pub pi_z: GroupElement,
    /// Opening witness of `z` at `zeta * omega`
    pub pi_z_omega: GroupElement,
}

impl Proof {
    /// Commitments in transcript order with their labels
    pub fn commitments(&self) -> [(&'static str, &GroupElement); 9] {
        [
            ("W_1", &self.w[0]),
            ("W_2", &self.w[1]),
            ("W_3", &self.w[2]),
            ("Z_PERM", &self.z),
            ("T_LO", &self.t[0]),
            ("T_MID", &self.t[1]),
            ("T_HI", &self.t[2]),
            ("PI_Z", &self.pi_z),
            ("PI_Z_OMEGA", &self.pi_z_omega),
        ]
    }

    /// Serialize the proof
    ///
    /// Layout: u32 LE public-input count, public inputs, then the nine
    /// compressed commitments interleaved with the evaluations in transcript
    /// order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.serialized_len());

        let mut count = [0u8; 4];
        LittleEndian::write_u32(&mut count, self.public_inputs.len() as u32);
        bytes.extend_from_slice(&count);
        for input in &self.public_inputs {
            bytes.extend_from_slice(&input.to_bytes());
        }

        for point in self.w.iter().chain(std::iter::once(&self.z)).chain(self.t.iter()) {
            bytes.extend_from_slice(&point.to_compressed());
        }
        for value in self.evaluations.to_array() {
            bytes.extend_from_slice(&value.to_bytes());
        }
        bytes.extend_from_slice(&self.pi_z.to_compressed());
        bytes.extend_from_slice(&self.pi_z_omega.to_compressed());
        bytes
    }

    /// Deserialize a proof produced by [`Proof::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        let count = reader
            .read_u32::<LittleEndian>()
            .map_err(|e| PlonkError::InvalidProof(e.to_string()))? as usize;

        let mut public_inputs = Vec::with_capacity(count.min(bytes.len() / SCALAR_BYTES));
        for _ in 0..count {
            public_inputs.push(read_scalar(&mut reader)?);
        }

        let w = [
            read_point(&mut reader)?,
            read_point(&mut reader)?,
            read_point(&mut reader)?,
        ];
        let z = read_point(&mut reader)?;
        let t = [
            read_point(&mut reader)?,
            read_point(&mut reader)?,
            read_point(&mut reader)?,
        ];

        let mut values = [Scalar::default(); 16];
        for value in values.iter_mut() {
            *value = read_scalar(&mut reader)?;
        }

        let pi_z = read_point(&mut reader)?;
        let pi_z_omega = read_point(&mut reader)?;

        if !reader.is_empty() {
            return Err(PlonkError::InvalidProof(format!(
                "{} trailing bytes",
                reader.len()
            )));
        }

        Ok(Self {
            public_inputs,
            w,
            z,
            t,
            evaluations: Evaluations::from_array(values),
            pi_z,
            pi_z_omega,
        })
    }

    fn serialized_len(&self) -> usize {
        4 + (self.public_inputs.len() + 16) * SCALAR_BYTES + 9 * POINT_BYTES
    }
}

fn read_scalar(reader: &mut &[u8]) -> Result<Scalar> {
    let mut buf = [0u8; SCALAR_BYTES];
    reader
        .read_exact(&mut buf)
        .map_err(|e| PlonkError::InvalidProof(e.to_string()))?;
    Option::from(Scalar::from_bytes(&buf))
        .ok_or_else(|| PlonkError::InvalidProof("non-canonical scalar".to_string()))
}

fn read_point(reader: &mut &[u8]) -> Result<GroupElement> {
    let mut buf = [0u8; POINT_BYTES];
    reader
        .read_exact(&mut buf)
        .map_err(|e| PlonkError::InvalidProof(e.to_string()))?;
    Option::from(GroupElement::from_compressed(&buf))
        .ok_or_else(|| PlonkError::InvalidProof("invalid G1 point".to_string()))
}
