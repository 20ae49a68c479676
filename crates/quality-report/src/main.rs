//! fpq-features: print the quality feature report of one fingerprint image
//!
//! Usage: `fpq-features <image> [config]`

use anyhow::{Context, Result};
use quality_report::{generate_report, init_logging, ReportConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let image_path = args
        .next()
        .map(PathBuf::from)
        .context("usage: fpq-features <image> [config]")?;
    let config_path = args.next().map(PathBuf::from);

    let config = ReportConfig::load(config_path.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    info!("=== Fingerprint Quality Features v{} ===", env!("CARGO_PKG_VERSION"));

    let report = generate_report(&config, &image_path)
        .with_context(|| format!("computing features for {}", image_path.display()))?;

    info!(
        "{} features, {} issues, {} failed modules",
        report.features.len(),
        report.issue_count(),
        report.failures.len()
    );
    println!("{}", report.to_json()?);

    Ok(())
}
