//! Recursion configuration
//!
//! Stored as JSON, e.g.
//!
//! ```json
//! { "inner_variant": "Ultra", "outer_variant": "Standard", "srs_path": "crs/bls12_381.srs" }
//! ```

use crate::{select_variants, RecursionError, Result, VariantConfig};
use plonk_arith::ComposerVariant;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Which circuit verifies which, and where the reference string lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecursionConfig {
    /// Variant of the circuit being proven
    pub inner_variant: ComposerVariant,
    /// Variant of the circuit verifying the proof
    pub outer_variant: ComposerVariant,
    /// Reference string file shared by both circuits
    pub srs_path: PathBuf,
}

impl Default for RecursionConfig {
    fn default() -> Self {
        Self {
            inner_variant: ComposerVariant::MAX,
            outer_variant: ComposerVariant::MAX,
            srs_path: PathBuf::from("crs/bls12_381.srs"),
        }
    }
}

impl RecursionConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| RecursionError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RecursionError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| RecursionError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| RecursionError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Variant triple for this pair
    pub fn variants(&self) -> Result<VariantConfig> {
        select_variants(self.inner_variant, self.outer_variant)
    }

    pub fn validate(&self) -> Result<()> {
        if self.srs_path.as_os_str().is_empty() {
            return Err(RecursionError::Config("srs_path is empty".to_string()));
        }
        self.variants().map(|_| ())
    }
}
