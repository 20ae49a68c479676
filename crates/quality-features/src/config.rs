//! Quality feature configuration

use crate::features::{
    BlockStatisticConfig, FrequencyDomainConfig, LocalContrastConfig, MuConfig,
    RegionOfInterestConfig,
};
use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// How the dispatcher runs registered modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One module after another on the calling thread
    #[default]
    Sequential,
    /// One task per module on the rayon pool
    Parallel,
}

/// Dispatcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub execution: ExecutionMode,
    /// Modules running longer than this are dropped from the batch
    pub module_deadline_ms: Option<u64>,
}

impl DispatcherConfig {
    /// Parallel execution without a deadline
    pub fn parallel() -> Self {
        Self {
            execution: ExecutionMode::Parallel,
            ..Default::default()
        }
    }
}

/// Configuration of the dispatcher and every built-in module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub dispatcher: DispatcherConfig,
    pub mu: MuConfig,
    pub block_statistic: BlockStatisticConfig,
    pub local_contrast: LocalContrastConfig,
    pub region_of_interest: RegionOfInterestConfig,
    pub frequency_domain: FrequencyDomainConfig,
}

impl QualityConfig {
    /// Reject values no module can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_block_size("mu.block_size", self.mu.block_size, 1)?;
        check_block_size("block_statistic.block_size", self.block_statistic.block_size, 1)?;
        check_block_size("local_contrast.block_size", self.local_contrast.block_size, 1)?;
        check_block_size("region_of_interest.block_size", self.region_of_interest.block_size, 2)?;
        // The spectrum needs at least two AC bins
        check_block_size("frequency_domain.block_size", self.frequency_domain.block_size, 4)?;

        check_finite("mu.empty_image_mu_threshold", self.mu.empty_image_mu_threshold)?;
        check_finite(
            "mu.uniform_image_sigma_threshold",
            self.mu.uniform_image_sigma_threshold,
        )?;
        check_finite(
            "region_of_interest.std_dev_threshold",
            self.region_of_interest.std_dev_threshold,
        )?;

        if self.dispatcher.module_deadline_ms == Some(0) {
            return Err(ConfigError::Invalid {
                field: "dispatcher.module_deadline_ms",
                reason: "deadline must be positive".to_string(),
            });
        }

        Ok(())
    }
}

fn check_block_size(field: &'static str, value: u32, min: u32) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("block size {value} is below the minimum of {min}"),
        });
    }
    Ok(())
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not a finite number"),
        });
    }
    Ok(())
}
