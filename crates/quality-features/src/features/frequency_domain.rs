//! Frequency Domain Analysis Feature
//!
//! Ridges form a roughly periodic signal across a block. For each textured
//! block the column and row averages are taken as 1-D ridge signatures; the
//! better-concentrated spectrum scores the block.

use crate::blocks::{Block, BlockGrid};
use crate::fft::RidgeSpectrum;
use crate::module::{Computed, FeatureDescriptor, FeatureModule, FeatureResult};
use crate::statistics::{bin10_fractions, SampleStatistics};
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::debug;

/// Frequency domain configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyDomainConfig {
    pub block_size: u32,
}

impl Default for FrequencyDomainConfig {
    fn default() -> Self {
        Self { block_size: 32 }
    }
}

/// Histogram of per-block spectral concentration
#[derive(Debug, Clone, Default)]
pub struct FrequencyDomainFeature {
    config: FrequencyDomainConfig,
    scored_blocks: Computed<usize>,
}

impl FrequencyDomainFeature {
    pub fn new(config: FrequencyDomainConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Number of blocks that carried a usable spectrum
    pub fn scored_blocks(&self) -> Result<usize, FeatureError> {
        self.scored_blocks.get(Self::MODULE_NAME, "scored_blocks")
    }

    fn score_block(spectrum: &mut RidgeSpectrum, block: Block, image: &FingerprintImage) -> Option<f64> {
        let size = block.size as usize;
        let mut columns = vec![0.0; size];
        let mut rows = Vec::with_capacity(size);

        for row in block.rows(image) {
            let mut sum = 0.0;
            for (acc, &p) in columns.iter_mut().zip(row) {
                *acc += p as f64;
                sum += p as f64;
            }
            rows.push(sum / size as f64);
        }
        for acc in &mut columns {
            *acc /= size as f64;
        }

        let across_columns = spectrum.analyze(&columns).map(|p| p.concentration);
        let across_rows = spectrum.analyze(&rows).map(|p| p.concentration);
        match (across_columns, across_rows) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }
}

impl FeatureDescriptor for FrequencyDomainFeature {
    const MODULE_NAME: &'static str = "FrequencyDomain";
    const SPEED_GROUP: &'static str = "FrequencyDomain";
    const FEATURE_IDS: &'static [&'static str] = &[
        "FDA_Bin10_0",
        "FDA_Bin10_1",
        "FDA_Bin10_2",
        "FDA_Bin10_3",
        "FDA_Bin10_4",
        "FDA_Bin10_5",
        "FDA_Bin10_6",
        "FDA_Bin10_7",
        "FDA_Bin10_8",
        "FDA_Bin10_9",
        "FDA_Bin10_Mean",
        "FDA_Bin10_StdDev",
    ];
}

impl FeatureModule for FrequencyDomainFeature {
    fn module_name(&self) -> &'static str {
        Self::MODULE_NAME
    }

    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError> {
        let grid = BlockGrid::new(Self::MODULE_NAME, image, self.config.block_size)?;
        let mut spectrum = RidgeSpectrum::new();

        let scores: Vec<f64> = grid
            .blocks()
            .filter(|b| b.statistics(image).std_dev > 0.0)
            .filter_map(|b| Self::score_block(&mut spectrum, b, image))
            .collect();

        if scores.is_empty() {
            return Err(FeatureError::malformed(
                Self::MODULE_NAME,
                "no block carries ridge structure",
            ));
        }

        let bins = bin10_fractions(&scores, 0.0, 1.0);
        let stats = SampleStatistics::compute(&scores);
        debug!(
            "FDA scored {}/{} blocks, mean={:.3}",
            scores.len(),
            grid.len(),
            stats.mean
        );

        self.scored_blocks = Computed::Ready(scores.len());

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
