//! Report configuration

use crate::ReportError;
use config::{Config, Environment, File};
use fingerprint_image::{DEFAULT_PPI, DEFAULT_WHITE_THRESHOLD};
use quality_features::{ConfigError, QualityConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment overrides, e.g. `FPQ__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "FPQ";

/// Image loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Resolution assumed for decoded images
    pub ppi: u16,

    /// Crop the bright scanner frame before computing features
    pub remove_white_frame: bool,

    /// Rows and columns with a mean at or above this are frame
    pub white_threshold: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            ppi: DEFAULT_PPI,
            remove_white_frame: true,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Everything the `fpq-features` command can be configured with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub features: QualityConfig,
    pub image: ImageConfig,
    pub logging: LoggingConfig,
}

impl ReportConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ReportError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let config: ReportConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.features.validate()?;
        if self.image.ppi == 0 {
            return Err(ConfigError::Invalid {
                field: "image.ppi",
                reason: "resolution must be positive".to_string(),
            });
        }
        Ok(())
    }
}
