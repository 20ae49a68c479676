//! Serializable quality report

use fingerprint_image::{FingerprintImage, ImageGeometry};
use quality_features::{
    ActionableFeedback, FeatureData, FeatureError, QualityComputation, FEATURE_SCHEMA_VERSION,
};
use serde::Serialize;

/// Timing of one module invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedEntry {
    pub group: &'static str,
    pub elapsed_ms: f64,
}

/// A module that contributed nothing, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub module: &'static str,
    pub speed_group: &'static str,
    pub error: String,
}

/// Everything computed for one image
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub schema_version: u32,
    pub image: ImageGeometry,
    pub features: Vec<FeatureData>,
    pub speeds: Vec<SpeedEntry>,
    pub actionable_feedback: Vec<ActionableFeedback>,
    pub failures: Vec<FailureEntry>,
}

impl QualityReport {
    pub fn from_computation(
        image: &FingerprintImage,
        computation: &QualityComputation,
    ) -> Result<Self, FeatureError> {
        let speeds = computation
            .feature_speeds()
            .into_iter()
            .map(|s| SpeedEntry {
                group: s.group_identifier,
                elapsed_ms: s.elapsed.as_secs_f64() * 1000.0,
            })
            .collect();

        let failures = computation
            .failures()
            .iter()
            .map(|f| FailureEntry {
                module: f.module_name,
                speed_group: f.speed_group,
                error: f.error.to_string(),
            })
            .collect();

        Ok(Self {
            schema_version: FEATURE_SCHEMA_VERSION,
            image: image.geometry(),
            features: computation.feature_data(),
            speeds,
            actionable_feedback: computation.actionable_feedback()?,
            failures,
        })
    }

    /// Number of feedback entries flagging an issue
    pub fn issue_count(&self) -> usize {
        self.actionable_feedback
            .iter()
            .filter(|f| f.issue_detected)
            .count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
