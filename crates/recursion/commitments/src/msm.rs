//! Multi-scalar multiplication
//!
//! Commitments to prover polynomials and the native verifier's batch opening
//! both reduce to `sum_i scalars[i] * points[i]`.

use crate::{CommitmentError, GroupElement, GroupProjective, Result, Scalar};
use ff::PrimeField;
use group::prime::PrimeCurveAffine;
use rayon::prelude::*;
use std::cmp;

const SCALAR_BITS: usize = 256;

/// Performs multi-scalar multiplication: sum_i(scalars[i] * points[i])
pub fn msm(scalars: &[Scalar], points: &[GroupElement]) -> Result<GroupProjective> {
    if scalars.len() != points.len() {
        return Err(CommitmentError::MsmError(format!(
            "{} scalars for {} points",
            scalars.len(),
            points.len()
        )));
    }

    if scalars.is_empty() {
        return Ok(GroupProjective::identity());
    }

    if scalars.len() <= 32 {
        return Ok(simple_msm(scalars, points));
    }

    Ok(pippenger_msm(scalars, points))
}

fn simple_msm(scalars: &[Scalar], points: &[GroupElement]) -> GroupProjective {
    scalars
        .iter()
        .zip(points.iter())
        .map(|(scalar, point)| point.to_curve() * scalar)
        .fold(GroupProjective::identity(), |acc, point| acc + point)
}

/// Bucket method, most significant window first
fn pippenger_msm(scalars: &[Scalar], points: &[GroupElement]) -> GroupProjective {
    let window_size = optimal_window_size(scalars.len());
    let num_windows = (SCALAR_BITS + window_size - 1) / window_size;
    let reprs: Vec<[u8; 32]> = scalars.iter().map(|s| s.to_repr()).collect();

    let mut result = GroupProjective::identity();
    for window_idx in (0..num_windows).rev() {
        let bit_start = window_idx * window_size;
        let bit_end = cmp::min(bit_start + window_size, SCALAR_BITS);

        for _ in bit_start..bit_end {
            result = result.double();
        }
        result += process_window(&reprs, points, bit_start, bit_end);
    }

    result
}

fn process_window(
    reprs: &[[u8; 32]],
    points: &[GroupElement],
    bit_start: usize,
    bit_end: usize,
) -> GroupProjective {
    let num_buckets = (1 << (bit_end - bit_start)) - 1;
    let mut buckets = vec![GroupProjective::identity(); num_buckets];

    for (repr, point) in reprs.iter().zip(points.iter()) {
        let bucket_idx = extract_window_bits(repr, bit_start, bit_end);
        if bucket_idx > 0 {
            buckets[bucket_idx - 1] += point;
        }
    }

    let mut result = GroupProjective::identity();
    let mut running_sum = GroupProjective::identity();
    for bucket in buckets.into_iter().rev() {
        running_sum += bucket;
        result += running_sum;
    }

    result
}

/// Bits `[bit_start, bit_end)` of a little-endian scalar encoding
fn extract_window_bits(repr: &[u8; 32], bit_start: usize, bit_end: usize) -> usize {
    let mut result = 0usize;
    for bit_idx in bit_start..bit_end {
        let bit = (repr[bit_idx / 8] >> (bit_idx % 8)) & 1;
        result |= (bit as usize) << (bit_idx - bit_start);
    }
    result
}

fn optimal_window_size(n: usize) -> usize {
    if n <= 32 {
        3
    } else if n <= 128 {
        4
    } else if n <= 512 {
        5
    } else if n <= 2048 {
        6
    } else if n <= 8192 {
        7
    } else {
        8
    }
}

/// Parallel MSM for very large inputs
pub fn parallel_msm(scalars: &[Scalar], points: &[GroupElement]) -> Result<GroupProjective> {
    if scalars.len() != points.len() {
        return Err(CommitmentError::MsmError(format!(
            "{} scalars for {} points",
            scalars.len(),
            points.len()
        )));
    }

    if scalars.len() <= 1024 {
        return msm(scalars, points);
    }

    let chunk_size = cmp::max(1024, scalars.len() / rayon::current_num_threads());
    let partial_results: Result<Vec<GroupProjective>> = scalars
        .par_chunks(chunk_size)
        .zip(points.par_chunks(chunk_size))
        .map(|(scalar_chunk, point_chunk)| msm(scalar_chunk, point_chunk))
        .collect();

    Ok(partial_results?
        .into_iter()
        .fold(GroupProjective::identity(), |acc, partial| acc + partial))
}
