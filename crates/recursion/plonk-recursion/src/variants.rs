//! Prover, verifier and recursive-settings selection
//!
//! The Fiat-Shamir hash used to prove the inner circuit must be the hash the
//! outer circuit replays. An Ultra proof hashed with the Ultra hash cannot be
//! replayed by a Standard outer circuit, so that pair switches to the
//! ultra-to-standard triple, which proves with the standard hash.
//!
//! | inner | outer | prover / verifier / settings |
//! |---|---|---|
//! | Ultra | Ultra | `Ultra` |
//! | Ultra | Standard | `UltraToStandard` |
//! | Standard | Standard | `Standard` |
//! | Standard | Ultra | `Standard` |

use crate::{RecursionError, Result};
use commitments::HashKind;
use plonk_arith::ComposerVariant;
use plonk_core::{ProverKind, VerifierKind};
use serde::{Deserialize, Serialize};

/// How the in-circuit verifier replays an inner transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecursiveSettings {
    /// Standard inner proof, standard hash
    Standard,
    /// Ultra inner proof, Ultra hash
    Ultra,
    /// Ultra inner proof, standard hash
    UltraToStandard,
}

impl RecursiveSettings {
    /// Hash used to derive the replayed challenges
    pub fn transcript_hash(&self) -> HashKind {
        match self {
            RecursiveSettings::Standard | RecursiveSettings::UltraToStandard => HashKind::Standard,
            RecursiveSettings::Ultra => HashKind::Ultra,
        }
    }

    /// Variant of the inner circuit these settings verify
    pub fn inner_variant(&self) -> ComposerVariant {
        match self {
            RecursiveSettings::Standard => ComposerVariant::Standard,
            RecursiveSettings::Ultra | RecursiveSettings::UltraToStandard => ComposerVariant::Ultra,
        }
    }

    /// Fail unless an `outer` composer can replay these settings
    pub fn check_outer(&self, outer: ComposerVariant) -> Result<()> {
        if outer.supports_hash(self.transcript_hash()) {
            Ok(())
        } else {
            Err(RecursionError::UnsupportedVariantPair {
                inner: self.inner_variant(),
                outer,
            })
        }
    }
}

/// Matching prover, native verifier and recursive settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantConfig {
    pub prover: ProverKind,
    pub verifier: VerifierKind,
    pub settings: RecursiveSettings,
}

impl VariantConfig {
    /// Hash shared by all three members
    pub fn transcript_hash(&self) -> HashKind {
        self.settings.transcript_hash()
    }
}

/// Pick the triple for an `(inner, outer)` pair
pub fn select_variants(inner: ComposerVariant, outer: ComposerVariant) -> Result<VariantConfig> {
    let config = match (inner, outer) {
        (ComposerVariant::Ultra, ComposerVariant::Ultra) => VariantConfig {
            prover: ProverKind::Ultra,
            verifier: VerifierKind::Ultra,
            settings: RecursiveSettings::Ultra,
        },
        (ComposerVariant::Ultra, ComposerVariant::Standard) => VariantConfig {
            prover: ProverKind::UltraToStandard,
            verifier: VerifierKind::UltraToStandard,
            settings: RecursiveSettings::UltraToStandard,
        },
        (ComposerVariant::Standard, ComposerVariant::Standard)
        | (ComposerVariant::Standard, ComposerVariant::Ultra) => VariantConfig {
            prover: ProverKind::Standard,
            verifier: VerifierKind::Standard,
            settings: RecursiveSettings::Standard,
        },
    };

    let hash = config.transcript_hash();
    if config.prover.transcript_hash() != hash || config.verifier.transcript_hash() != hash {
        return Err(RecursionError::UnsupportedVariantPair { inner, outer });
    }
    config.settings.check_outer(outer)?;
    Ok(config)
}
