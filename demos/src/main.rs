//! Recursive circuit walkthrough
//!
//! Proves `5 + 7 == 12`, verifies that proof inside an outer circuit for
//! every variant pair, and prints the outer public inputs. A wrong sum is
//! rejected before any proof is made.
//!
//! Run with: `cargo run -p recursion-demos -- [config.json]`
//!
//! Set `RUST_LOG=debug` for per-stage output.

use anyhow::{Context, Result};
use bls12_381::Scalar;
use commitments::ReferenceString;
use plonk_arith::ComposerVariant;
use plonk_recursion::{RecursionConfig, RecursionError, RecursiveCircuit};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEMO_SRS_SIZE: usize = 32;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => RecursionConfig::from_json_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => RecursionConfig {
            srs_path: std::env::temp_dir().join("recursion-demo.srs"),
            ..RecursionConfig::default()
        },
    };
    let srs = Arc::new(load_or_create_srs(&config.srs_path)?);

    let inputs = [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(12u64)];
    println!("Recursive verification of a + b == c with a = 5, b = 7, c = 12");

    let variants = [ComposerVariant::Standard, ComposerVariant::Ultra];
    for inner in variants {
        for outer in variants {
            let start = Instant::now();
            let composer = RecursiveCircuit::generate_with_reference_string(
                srs.clone(),
                inputs,
                inner,
                outer,
            )
            .with_context(|| format!("inner {:?}, outer {:?}", inner, outer))?;
            println!(
                "  inner {:<8} outer {:<8} {:>6} gates  {:>4} ms",
                format!("{:?}", inner),
                format!("{:?}", outer),
                composer.num_gates(),
                start.elapsed().as_millis()
            );
        }
    }

    let composer = RecursiveCircuit::from_config(&config, inputs)?;
    println!(
        "Public inputs for inner {:?}, outer {:?}:",
        config.inner_variant, config.outer_variant
    );
    let labels = [
        "b", "c", "P0.x_lo", "P0.x_hi", "P0.y_lo", "P0.y_hi", "P1.x_lo", "P1.x_hi", "P1.y_lo",
        "P1.y_hi",
    ];
    for (label, value) in labels.iter().zip(composer.public_input_values()) {
        let mut bytes = value.to_bytes();
        bytes.reverse();
        println!("  {:<8} 0x{}", label, hex::encode(bytes));
    }

    let wrong = [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(13u64)];
    match RecursiveCircuit::generate_with_reference_string(
        srs,
        wrong,
        config.inner_variant,
        config.outer_variant,
    ) {
        Err(RecursionError::InnerCircuitUnsatisfied(reason)) => {
            println!("c = 13 rejected: {}", reason)
        }
        Err(err) => return Err(err.into()),
        Ok(_) => anyhow::bail!("c = 13 was accepted"),
    }

    Ok(())
}

/// Demo-only: an insecure reference string is generated when none exists
fn load_or_create_srs(path: &Path) -> Result<ReferenceString> {
    if path.exists() {
        return ReferenceString::read_from_path(path)
            .with_context(|| format!("reading reference string {}", path.display()));
    }
    tracing::warn!(path = %path.display(), "no reference string found, generating an insecure one");
    let srs = ReferenceString::insecure_from_seed(DEMO_SRS_SIZE, b"recursion-demo")?;
    srs.write_to_path(path)
        .with_context(|| format!("writing reference string {}", path.display()))?;
    Ok(srs)
}
