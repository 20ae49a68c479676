//! Feature Module Contract
//!
//! A feature module computes one family of quality metrics. Instance-level
//! behaviour lives in [`FeatureModule`] (object safe, so the dispatcher can
//! hold heterogeneous modules); the identifier namespace lives in
//! [`FeatureDescriptor`] as associated constants, so enumerating IDs never
//! requires running a computation.

use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use serde::Serialize;
use std::any::Any;
use std::time::Duration;

/// One named scalar produced by a module
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureResult {
    pub identifier: &'static str,
    pub value: f64,
}

impl FeatureResult {
    pub fn new(identifier: &'static str, value: f64) -> Self {
        Self { identifier, value }
    }
}

/// A feature result with its source module attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureData {
    pub identifier: &'static str,
    pub value: f64,
    pub module_name: &'static str,
}

/// Feedback value that maps to a concrete, fixable quality issue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActionableFeedback {
    pub identifier: &'static str,
    pub value: f64,
    /// Value crossed the configured threshold for this identifier
    pub issue_detected: bool,
}

/// Wall-clock cost of one module invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSpeed {
    pub group_identifier: &'static str,
    pub elapsed: Duration,
}

/// Instance operations of a quality feature module
///
/// An instance serves exactly one computation: the dispatcher creates it,
/// calls [`compute_feature_data`](Self::compute_feature_data) once and hands
/// it back to the caller for reading.
pub trait FeatureModule: Send + 'static {
    /// Stable name used for provenance and failure reports
    fn module_name(&self) -> &'static str;

    /// Compute every declared feature in one pass
    ///
    /// Must not read anything but `image`. Derived statistics needed by
    /// auxiliary accessors are stored on `self`.
    fn compute_feature_data(
        &mut self,
        image: &FingerprintImage,
    ) -> Result<Vec<FeatureResult>, FeatureError>;

    /// Feedback for the module's actionable identifiers
    fn actionable_feedback(&self) -> Result<Vec<ActionableFeedback>, FeatureError> {
        Ok(Vec::new())
    }

    /// Access to the concrete type, for auxiliary accessors
    fn as_any(&self) -> &dyn Any;
}

/// Type-level declaration of a module's identifier namespace
pub trait FeatureDescriptor: FeatureModule + Sized {
    const MODULE_NAME: &'static str;

    /// Timing bucket, possibly shared with other modules
    const SPEED_GROUP: &'static str;

    /// Every identifier `compute_feature_data` emits, in emission order
    const FEATURE_IDS: &'static [&'static str];

    /// Subset of `FEATURE_IDS` that `actionable_feedback` reports on
    const ACTIONABLE_IDS: &'static [&'static str] = &[];
}

/// Result of a write-once derived statistic
///
/// Used by modules to back their auxiliary accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Computed<T> {
    Pending,
    Ready(T),
}

impl<T> Default for Computed<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T: Copy> Computed<T> {
    pub(crate) fn get(
        &self,
        module: &'static str,
        accessor: &'static str,
    ) -> Result<T, FeatureError> {
        match self {
            Self::Ready(value) => Ok(*value),
            Self::Pending => Err(FeatureError::UninitializedState { module, accessor }),
        }
    }
}
