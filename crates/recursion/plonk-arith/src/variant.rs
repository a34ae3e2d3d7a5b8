//! Composer variants

use commitments::HashKind;
use serde::{Deserialize, Serialize};

/// Proof-system variant of a composer
///
/// `Ultra` is the most expressive variant: it has a dedicated gate for a
/// round of the transcript permutation and can therefore evaluate both hash
/// flavours. `Standard` evaluates the standard hash by expanding each round
/// into arithmetic gates.
///
/// Both variants record curve gates over 192-bit limbs. Curve and hash-round
/// gates are not arithmetized; the proving key exposes their wires and the
/// verifier re-checks them natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComposerVariant {
    /// Arithmetic and curve gates
    Standard,
    /// Standard gates plus the transcript-permutation round gate
    Ultra,
}

impl ComposerVariant {
    /// The most expressive variant
    pub const MAX: ComposerVariant = ComposerVariant::Ultra;

    /// Transcript hash a prover for this variant uses by default
    pub fn native_hash(&self) -> HashKind {
        match self {
            ComposerVariant::Standard => HashKind::Standard,
            ComposerVariant::Ultra => HashKind::Ultra,
        }
    }

    /// Whether a circuit of this variant can replay the given hash
    pub fn supports_hash(&self, kind: HashKind) -> bool {
        match (self, kind) {
            (ComposerVariant::Ultra, _) => true,
            (ComposerVariant::Standard, HashKind::Standard) => true,
            (ComposerVariant::Standard, HashKind::Ultra) => false,
        }
    }

    /// Whether the permutation-round gate is available
    pub fn has_hash_round_gate(&self) -> bool {
        matches!(self, ComposerVariant::Ultra)
    }
}

impl Default for ComposerVariant {
    fn default() -> Self {
        ComposerVariant::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_support() {
        assert!(ComposerVariant::Ultra.supports_hash(HashKind::Ultra));
        assert!(ComposerVariant::Ultra.supports_hash(HashKind::Standard));
        assert!(ComposerVariant::Standard.supports_hash(HashKind::Standard));
        assert!(!ComposerVariant::Standard.supports_hash(HashKind::Ultra));
    }

    #[test]
    fn test_native_hash_is_supported() {
        for variant in [ComposerVariant::Standard, ComposerVariant::Ultra] {
            assert!(variant.supports_hash(variant.native_hash()));
        }
    }
}
