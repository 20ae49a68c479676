//! Block Statistic Feature
//!
//! Spread of local mean intensity: the image is cut into blocks, each block
//! is reduced to its mean, and the standard deviation ("sigma") of those
//! means is reported. A well-captured print alternates ridges and valleys
//! evenly, so its block means sit close together; smudges, dry patches and
//! partial contact push them apart.

use crate::blocks::BlockGrid;
use crate::module::{Computed, FeatureDescriptor, FeatureModule, FeatureResult};
use crate::statistics::SampleStatistics;
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Block statistic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockStatisticConfig {
    /// Edge length of the square analysis blocks (pixels)
    pub block_size: u32,
}

impl Default for BlockStatisticConfig {
    fn default() -> Self {
        Self { block_size: 32 }
    }
}

/// Standard deviation of block means
#[derive(Debug, Clone, Default)]
pub struct BlockStatisticFeature {
    config: BlockStatisticConfig,
    sigma: Computed<f64>,
    block_mean: Computed<f64>,
}

impl BlockStatisticFeature {
    pub const SIGMA_ID: &'static str = "BlockMean_Sigma";

    pub fn new(config: BlockStatisticConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Standard deviation of the block means
    pub fn sigma(&self) -> Result<f64, FeatureError> {
        self.sigma.get(Self::MODULE_NAME, "sigma")
    }

    /// Mean of the block means
    pub fn block_mean(&self) -> Result<f64, FeatureError> {
        self.block_mean.get(Self::MODULE_NAME, "block_mean")
    }
}

impl FeatureDescriptor for BlockStatisticFeature {
    const MODULE_NAME: &'static str = "BlockStatistic";
    const SPEED_GROUP: &'static str = "Contrast";
    const FEATURE_IDS: &'static [&'static str] = &[Self::SIGMA_ID];
}

impl FeatureModule for BlockStatisticFeature {
    fn module_name(&self) -> &'static str {
        Self::MODULE_NAME
    }

    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError> {
        let grid = BlockGrid::new(Self::MODULE_NAME, image, self.config.block_size)?;

        let means: Vec<f64> = grid.blocks().map(|b| b.statistics(image).mean).collect();
        let stats = SampleStatistics::compute(&means);

        debug!(
            "Block statistics: {} blocks, mean={:.2}, sigma={:.3}",
            grid.len(),
            stats.mean,
            stats.std_dev
        );

        self.block_mean = Computed::Ready(stats.mean);
        self.sigma = Computed::Ready(stats.std_dev);

        Ok(vec![FeatureResult::new(Self::SIGMA_ID, stats.std_dev)])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerprint_image::DEFAULT_PPI;

    fn module(block_size: u32) -> BlockStatisticFeature {
        BlockStatisticFeature::new(BlockStatisticConfig { block_size })
    }

    #[test]
    fn test_uniform_image_has_zero_sigma() {
        let img = FingerprintImage::uniform(128, 128, 128, DEFAULT_PPI).unwrap();
        let mut feature = module(16);
        let results = feature.compute_feature_data(&img).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identifier, "BlockMean_Sigma");
        assert!(results[0].value.abs() < 1e-12);
        assert_eq!(feature.block_mean().unwrap(), 128.0);
    }

    #[test]
    fn test_sigma_before_compute() {
        let feature = module(16);
        assert_eq!(
            feature.sigma(),
            Err(FeatureError::UninitializedState {
                module: "BlockStatistic",
                accessor: "sigma"
            })
        );
        assert!(feature.block_mean().is_err());
    }

    #[test]
    fn test_sigma_matches_reported_value() {
        // Two blocks at 0 and 100: means 0 and 100, sigma 50
        let data: Vec<u8> = (0..32 * 16).map(|i| if i % 32 < 16 { 0 } else { 100 }).collect();
        let img = FingerprintImage::new(data, 32, 16, DEFAULT_PPI).unwrap();
        let mut feature = module(16);
        let results = feature.compute_feature_data(&img).unwrap();

        assert!((results[0].value - 50.0).abs() < 1e-9);
        assert_eq!(feature.sigma().unwrap(), results[0].value);
        assert!((feature.block_mean().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_smaller_than_block() {
        let img = FingerprintImage::uniform(8, 8, 128, DEFAULT_PPI).unwrap();
        let mut feature = module(16);
        let err = feature.compute_feature_data(&img).unwrap_err();
        assert!(matches!(err, FeatureError::MalformedInput { module: "BlockStatistic", .. }));
        assert!(feature.sigma().is_err());
    }

    #[test]
    fn test_trailing_partial_block_ignored() {
        // 20x16 with block 16: the 4-pixel strip on the right is dark but discarded
        let data: Vec<u8> = (0..20 * 16).map(|i| if i % 20 < 16 { 90 } else { 0 }).collect();
        let img = FingerprintImage::new(data, 20, 16, DEFAULT_PPI).unwrap();
        let mut feature = module(16);
        feature.compute_feature_data(&img).unwrap();
        assert_eq!(feature.block_mean().unwrap(), 90.0);
    }
}
