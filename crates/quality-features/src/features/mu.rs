//! Global intensity features (Mu, MMB) and the image-wide sigma

use crate::blocks::BlockGrid;
use crate::module::{ActionableFeedback, Computed, FeatureDescriptor, FeatureModule, FeatureResult};
use crate::statistics::SampleStatistics;
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Mu configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MuConfig {
    /// Block size for the mean of block means (pixels)
    pub block_size: u32,
    /// Mu above this flags an empty or washed-out image
    pub empty_image_mu_threshold: f64,
    /// Sigma below this flags a uniform image
    pub uniform_image_sigma_threshold: f64,
}

impl Default for MuConfig {
    fn default() -> Self {
        Self {
            block_size: 32,
            empty_image_mu_threshold: 250.0,
            uniform_image_sigma_threshold: 1.0,
        }
    }
}

/// Arithmetic mean of the image and of its block means
#[derive(Debug, Clone, Default)]
pub struct MuFeature {
    config: MuConfig,
    mu: Computed<f64>,
    sigma: Computed<f64>,
}

impl MuFeature {
    pub const MMB_ID: &'static str = "MMB";
    /// Actionable: an empty or washed-out image
    pub const MU_ID: &'static str = "Mu";
    /// Actionable: a uniform image
    pub const SIGMA_ID: &'static str = "Mu_Sigma";

    pub fn new(config: MuConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Population standard deviation of all pixels
    pub fn sigma(&self) -> Result<f64, FeatureError> {
        self.sigma.get(Self::MODULE_NAME, "sigma")
    }

    /// Arithmetic mean of all pixels
    pub fn mu(&self) -> Result<f64, FeatureError> {
        self.mu.get(Self::MODULE_NAME, "mu")
    }
}

impl FeatureDescriptor for MuFeature {
    const MODULE_NAME: &'static str = "Mu";
    const SPEED_GROUP: &'static str = "Contrast";
    const FEATURE_IDS: &'static [&'static str] = &[Self::MMB_ID, Self::MU_ID, Self::SIGMA_ID];
    const ACTIONABLE_IDS: &'static [&'static str] = &[Self::MU_ID, Self::SIGMA_ID];
}

impl FeatureModule for MuFeature {
    fn module_name(&self) -> &'static str {
        Self::MODULE_NAME
    }

    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError> {
        let grid = BlockGrid::new(Self::MODULE_NAME, image, self.config.block_size)?;

        let block_means: Vec<f64> = grid.blocks().map(|b| b.statistics(image).mean).collect();
        let mmb = SampleStatistics::compute(&block_means).mean;
        let global = SampleStatistics::from_pixels(image.pixels());

        debug!("Mu={:.2}, MMB={:.2}, sigma={:.3}", global.mean, mmb, global.std_dev);

        self.mu = Computed::Ready(global.mean);
        self.sigma = Computed::Ready(global.std_dev);

        Ok(vec![
            FeatureResult::new(Self::MMB_ID, mmb),
            FeatureResult::new(Self::MU_ID, global.mean),
            FeatureResult::new(Self::SIGMA_ID, global.std_dev),
        ])
    }

    fn actionable_feedback(&self) -> Result<Vec<ActionableFeedback>, FeatureError> {
        let mu = self.mu()?;
        let sigma = self.sigma()?;

        Ok(vec![
            ActionableFeedback {
                identifier: Self::MU_ID,
                value: mu,
                issue_detected: mu > self.config.empty_image_mu_threshold,
            },
            ActionableFeedback {
                identifier: Self::SIGMA_ID,
                value: sigma,
                issue_detected: sigma < self.config.uniform_image_sigma_threshold,
            },
        ])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerprint_image::DEFAULT_PPI;

    #[test]
    fn test_uniform_image() {
        let img = FingerprintImage::uniform(64, 64, 128, DEFAULT_PPI).unwrap();
        let mut feature = MuFeature::new(MuConfig::default());
        let results = feature.compute_feature_data(&img).unwrap();

        let ids: Vec<_> = results.iter().map(|r| r.identifier).collect();
        assert_eq!(ids, MuFeature::FEATURE_IDS);
        assert_eq!(results[0].value, 128.0);
        assert_eq!(results[1].value, 128.0);
        assert_eq!(results[2].value, 0.0);
        assert_eq!(feature.sigma().unwrap(), 0.0);

        let feedback = feature.actionable_feedback().unwrap();
        assert_eq!(feedback[0].identifier, "Mu");
        assert!(!feedback[0].issue_detected);
        assert_eq!(feedback[1].identifier, "Mu_Sigma");
        assert!(feedback[1].issue_detected);
    }

    #[test]
    fn test_feedback_mirrors_emitted_values() {
        let data: Vec<u8> = (0..64 * 64).map(|i| (i % 7 * 30) as u8).collect();
        let img = FingerprintImage::new(data, 64, 64, DEFAULT_PPI).unwrap();
        let mut feature = MuFeature::new(MuConfig::default());
        let results = feature.compute_feature_data(&img).unwrap();

        for feedback in feature.actionable_feedback().unwrap() {
            let emitted = results.iter().find(|r| r.identifier == feedback.identifier).unwrap();
            assert_eq!(emitted.value, feedback.value);
        }
    }

    #[test]
    fn test_white_image_flags_empty() {
        let img = FingerprintImage::uniform(32, 32, 255, DEFAULT_PPI).unwrap();
        let mut feature = MuFeature::new(MuConfig::default());
        feature.compute_feature_data(&img).unwrap();
        let feedback = feature.actionable_feedback().unwrap();
        assert!(feedback[0].issue_detected);
    }

    #[test]
    fn test_accessors_before_compute() {
        let feature = MuFeature::new(MuConfig::default());
        assert!(matches!(feature.sigma(), Err(FeatureError::UninitializedState { .. })));
        assert!(matches!(
            feature.actionable_feedback(),
            Err(FeatureError::UninitializedState { module: "Mu", .. })
        ));
    }

    #[test]
    fn test_mmb_ignores_partial_blocks() {
        // Full 32x32 block at 100, 8-pixel strip at 0 below it
        let data: Vec<u8> = (0..32 * 40).map(|i| if i < 32 * 32 { 100 } else { 0 }).collect();
        let img = FingerprintImage::new(data, 32, 40, DEFAULT_PPI).unwrap();
        let mut feature = MuFeature::new(MuConfig::default());
        let results = feature.compute_feature_data(&img).unwrap();
        assert_eq!(results[0].value, 100.0);
        assert!((results[1].value - 80.0).abs() < 1e-9);
    }
}
