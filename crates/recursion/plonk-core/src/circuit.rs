//! Circuit definitions

use crate::Result;
use plonk_arith::Composer;

/// Trait for defining circuits
pub trait Circuit {
    /// Allocate witnesses and gates into `composer`
    fn synthesize(&self, composer: &mut Composer) -> Result<()>;
}
