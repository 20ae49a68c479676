//! Region of Interest Feature
//!
//! Separates fingerprint foreground from background by block variance and
//! reports the intensity and extent of the foreground. An image without any
//! foreground block is a valid result: mean and coverage are 0 and the area
//! feedback flags it.

use crate::blocks::BlockGrid;
use crate::module::{ActionableFeedback, Computed, FeatureDescriptor, FeatureModule, FeatureResult};
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Region of interest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOfInterestConfig {
    pub block_size: u32,
    /// Minimum pixel standard deviation of a foreground block
    pub std_dev_threshold: f64,
    /// Fewer foreground pixels than this flags insufficient foreground
    pub min_foreground_pixels: u64,
}

impl Default for RegionOfInterestConfig {
    fn default() -> Self {
        Self {
            block_size: 32,
            std_dev_threshold: 10.0,
            min_foreground_pixels: 50_000,
        }
    }
}

/// Foreground mean intensity and coverage
#[derive(Debug, Clone, Default)]
pub struct RegionOfInterestFeature {
    config: RegionOfInterestConfig,
    foreground_pixels: Computed<u64>,
}

impl RegionOfInterestFeature {
    pub const MEAN_ID: &'static str = "RegionOfInterest_Mean";
    pub const COVERAGE_ID: &'static str = "RegionOfInterest_Coverage";
    /// Actionable: too little fingerprint foreground
    pub const AREA_ID: &'static str = "RegionOfInterest_Area";

    pub fn new(config: RegionOfInterestConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Number of pixels in foreground blocks
    pub fn foreground_pixels(&self) -> Result<u64, FeatureError> {
        self.foreground_pixels.get(Self::MODULE_NAME, "foreground_pixels")
    }
}

impl FeatureDescriptor for RegionOfInterestFeature {
    const MODULE_NAME: &'static str = "RegionOfInterest";
    const SPEED_GROUP: &'static str = "RegionOfInterest";
    const FEATURE_IDS: &'static [&'static str] = &[Self::MEAN_ID, Self::COVERAGE_ID, Self::AREA_ID];
    const ACTIONABLE_IDS: &'static [&'static str] = &[Self::AREA_ID];
}

impl FeatureModule for RegionOfInterestFeature {
    fn module_name(&self) -> &'static str {
        Self::MODULE_NAME
    }

    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError> {
        let grid = BlockGrid::new(Self::MODULE_NAME, image, self.config.block_size)?;

        let foreground_means: Vec<f64> = grid
            .blocks()
            .map(|b| b.statistics(image))
            .filter(|s| s.std_dev >= self.config.std_dev_threshold)
            .map(|s| s.mean)
            .collect();

        // Every block has the same area, so averaging block means is exact
        let mean = if foreground_means.is_empty() {
            0.0
        } else {
            foreground_means.iter().sum::<f64>() / foreground_means.len() as f64
        };
        let coverage = foreground_means.len() as f64 / grid.len() as f64;
        let pixels = (foreground_means.len() * grid.block_area()) as u64;

        debug!(
            "Foreground: {}/{} blocks, {} pixels, mean={:.2}",
            foreground_means.len(),
            grid.len(),
            pixels,
            mean
        );

        self.foreground_pixels = Computed::Ready(pixels);

        Ok(vec![
            FeatureResult::new(Self::MEAN_ID, mean),
            FeatureResult::new(Self::COVERAGE_ID, coverage),
            FeatureResult::new(Self::AREA_ID, pixels as f64),
        ])
    }

    fn actionable_feedback(&self) -> Result<Vec<ActionableFeedback>, FeatureError> {
        let pixels = self.foreground_pixels()?;
        Ok(vec![ActionableFeedback {
            identifier: Self::AREA_ID,
            value: pixels as f64,
            issue_detected: pixels < self.config.min_foreground_pixels,
        }])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
