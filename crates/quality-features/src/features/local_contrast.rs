//! Local Contrast Feature
//!
//! Per-block dynamic range, summarised as a ten-bin histogram plus the mean
//! and standard deviation of the block contrasts.

use crate::blocks::BlockGrid;
use crate::module::{Computed, FeatureDescriptor, FeatureModule, FeatureResult};
use crate::statistics::{bin10_fractions, SampleStatistics};
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Local contrast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalContrastConfig {
    pub block_size: u32,
}

impl Default for LocalContrastConfig {
    fn default() -> Self {
        Self { block_size: 32 }
    }
}

/// Histogram of block contrast `(max - min) / 255`
#[derive(Debug, Clone, Default)]
pub struct LocalContrastFeature {
    config: LocalContrastConfig,
    mean_contrast: Computed<f64>,
}

impl LocalContrastFeature {
    pub fn new(config: LocalContrastConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Mean block contrast in `[0, 1]`
    pub fn mean_contrast(&self) -> Result<f64, FeatureError> {
        self.mean_contrast.get(Self::MODULE_NAME, "mean_contrast")
    }
}

impl FeatureDescriptor for LocalContrastFeature {
    const MODULE_NAME: &'static str = "LocalContrast";
    const SPEED_GROUP: &'static str = "LocalContrast";
    const FEATURE_IDS: &'static [&'static str] = &[
        "LocalContrast_Bin10_0",
        "LocalContrast_Bin10_1",
        "LocalContrast_Bin10_2",
        "LocalContrast_Bin10_3",
        "LocalContrast_Bin10_4",
        "LocalContrast_Bin10_5",
        "LocalContrast_Bin10_6",
        "LocalContrast_Bin10_7",
        "LocalContrast_Bin10_8",
        "LocalContrast_Bin10_9",
        "LocalContrast_Bin10_Mean",
        "LocalContrast_Bin10_StdDev",
    ];
}

impl FeatureModule for LocalContrastFeature {
    fn module_name(&self) -> &'static str {
        Self::MODULE_NAME
    }

    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError> {
        let grid = BlockGrid::new(Self::MODULE_NAME, image, self.config.block_size)?;

        let contrasts: Vec<f64> = grid
            .blocks()
            .map(|b| {
                let stats = b.statistics(image);
                (stats.max - stats.min) / 255.0
            })
            .collect();

        let bins = bin10_fractions(&contrasts, 0.0, 1.0);
        let stats = SampleStatistics::compute(&contrasts);
        debug!("Local contrast over {} blocks: mean={:.3}", contrasts.len(), stats.mean);

        self.mean_contrast = Computed::Ready(stats.mean);

        let values = bins.into_iter().chain([stats.mean, stats.std_dev]);
        Ok(Self::FEATURE_IDS
            .iter()
            .zip(values)
            .map(|(&id, value)| FeatureResult::new(id, value))
            .collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
