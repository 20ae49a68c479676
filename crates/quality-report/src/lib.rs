//! Fingerprint Quality Report
//!
//! Loads an image, runs the default feature registry over it and renders
//! the outcome as a JSON report.

pub mod config;
pub mod report;

pub use config::{ImageConfig, LoggingConfig, ReportConfig};
pub use report::{FailureEntry, QualityReport, SpeedEntry};

use fingerprint_image::{FingerprintImage, ImageError};
use quality_features::{FeatureError, FeatureRegistry, RegistrationError};
use std::path::Path;
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration load failed: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] quality_features::ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Registry construction failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Unknown log level: {0}")]
    LogLevel(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging
///
/// Output goes to stderr so stdout carries only the report.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ReportError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| ReportError::LogLevel(config.level.clone()))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.map_err(|e| ReportError::Logging(e.to_string()))
}

/// Decode `path` and prepare it as configured
pub fn load_image(config: &ImageConfig, path: &Path) -> Result<FingerprintImage, ReportError> {
    let image = FingerprintImage::open(path, config.ppi)?;
    if !config.remove_white_frame {
        return Ok(image);
    }

    let cropped = image.remove_white_frame(config.white_threshold)?;
    if cropped.geometry() != image.geometry() {
        info!(
            "Removed white frame: {}x{} -> {}x{}",
            image.width(),
            image.height(),
            cropped.width(),
            cropped.height()
        );
    }
    Ok(cropped)
}

/// Compute the quality report of an already loaded image
pub fn build_report(
    config: &ReportConfig,
    image: &FingerprintImage,
) -> Result<QualityReport, ReportError> {
    let registry = FeatureRegistry::with_default_modules(&config.features)?;
    let computation = registry.compute_quality_features(image);
    Ok(QualityReport::from_computation(image, &computation)?)
}

/// Load the image at `path` and compute its quality report
pub fn generate_report(config: &ReportConfig, path: &Path) -> Result<QualityReport, ReportError> {
    let image = load_image(&config.image, path)?;
    build_report(config, &image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerprint_image::DEFAULT_PPI;
    use quality_features::DispatcherConfig;

    #[test]
    fn test_unknown_log_level() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            json: false,
        };
        assert!(matches!(init_logging(&config), Err(ReportError::LogLevel(_))));
    }

    #[test]
    fn test_missing_image() {
        let config = ReportConfig::default();
        let result = generate_report(&config, Path::new("/nonexistent/print.png"));
        assert!(matches!(result, Err(ReportError::Image(ImageError::Decode(_)))));
    }

    #[test]
    fn test_build_report_parallel() {
        let mut config = ReportConfig::default();
        config.features.dispatcher = DispatcherConfig::parallel();

        let image = FingerprintImage::uniform(96, 96, 40, DEFAULT_PPI).unwrap();
        let report = build_report(&config, &image).unwrap();

        let ids: Vec<_> = report.features.iter().map(|f| f.identifier).collect();
        assert_eq!(&ids[..4], &["MMB", "Mu", "Mu_Sigma", "BlockMean_Sigma"]);
        assert_eq!(report.failures.len(), 1);
    }
}
