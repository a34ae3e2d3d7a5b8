//! Fixtures shared by the benchmarks

use bls12_381::{G1Affine, G1Projective, Scalar};
use commitments::{CommitmentError, ReferenceString};
use ff::Field;
use group::{Curve, Group};
use plonk_arith::{Composer, ComposerVariant, FieldVar};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Benchmark configuration parameters
#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    /// Gate counts for circuit-size sweeps
    pub sizes: Vec<usize>,
    /// Seed for the insecure reference string and random inputs
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            sizes: vec![16, 64, 256],
            seed: 42,
        }
    }
}

impl BenchmarkConfig {
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    /// Reference string large enough for the largest swept circuit
    pub fn reference_string(&self) -> Result<Arc<ReferenceString>, CommitmentError> {
        let largest = self.sizes.iter().copied().max().unwrap_or(16);
        let size = (4 * largest).next_power_of_two();
        Ok(Arc::new(ReferenceString::insecure_from_seed(
            size,
            &self.seed.to_le_bytes(),
        )?))
    }
}

/// Circuit squaring a public input `gates` times
pub fn squaring_chain(
    variant: ComposerVariant,
    reference_string: Arc<ReferenceString>,
    gates: usize,
) -> Composer {
    let mut cs = Composer::new(variant, reference_string);
    let mut acc = FieldVar::from_public_witness(&mut cs, Scalar::from(3u64));
    for _ in 0..gates {
        acc = acc.square(&mut cs).add_constant(&mut cs, Scalar::ONE);
    }
    let out = FieldVar::from_public_witness(&mut cs, acc.value());
    acc.assert_equal(&mut cs, &out, "chain output");
    cs
}

/// Random scalars and points for MSM benchmarks
pub fn random_msm_inputs(size: usize, rng: &mut StdRng) -> (Vec<Scalar>, Vec<G1Affine>) {
    let scalars = (0..size).map(|_| Scalar::random(&mut *rng)).collect();
    let points = (0..size)
        .map(|_| G1Projective::random(&mut *rng).to_affine())
        .collect();
    (scalars, points)
}
