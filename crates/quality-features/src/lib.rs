//! Fingerprint Quality Features
//!
//! Pluggable quality feature modules and the dispatcher that runs them:
//! - Module contract with type-level identifier declarations
//! - Block statistic, global intensity, local contrast, foreground and
//!   frequency domain modules
//! - Registry that rejects identifier collisions at registration
//! - Sequential or parallel dispatch with partial-failure semantics

pub mod blocks;
pub mod config;
pub mod dispatch;
mod error;
pub mod features;
mod fft;
pub mod module;
pub mod registry;
pub mod statistics;

pub use config::{DispatcherConfig, ExecutionMode, QualityConfig};
pub use dispatch::{ComputedModule, ModuleFailure, QualityComputation};
pub use error::{ConfigError, FeatureError, RegistrationError};
pub use features::{
    BlockStatisticConfig, BlockStatisticFeature, FrequencyDomainConfig, FrequencyDomainFeature,
    LocalContrastConfig, LocalContrastFeature, MuConfig, MuFeature, RegionOfInterestConfig,
    RegionOfInterestFeature,
};
pub use fft::{RidgeSpectrum, SpectralPeak};
pub use module::{
    ActionableFeedback, FeatureData, FeatureDescriptor, FeatureModule, FeatureResult, FeatureSpeed,
};
pub use registry::{FeatureRegistry, ModuleRegistration};

/// Version of the feature identifier schema
///
/// Bump whenever an identifier is added, removed or changes meaning.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;
