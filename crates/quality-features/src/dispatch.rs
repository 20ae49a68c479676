//! Feature Dispatch and Aggregation
//!
//! Runs every registered module against one image and assembles the
//! combined outputs. A module that fails is dropped from the results and
//! recorded; the batch itself never fails.

use crate::config::ExecutionMode;
use crate::module::{ActionableFeedback, FeatureData, FeatureModule, FeatureResult, FeatureSpeed};
use crate::registry::{FeatureRegistry, ModuleRegistration};
use crate::FeatureError;
use fingerprint_image::FingerprintImage;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A module that completed its computation
pub struct ComputedModule {
    module: Box<dyn FeatureModule>,
    speed_group: &'static str,
    results: Vec<FeatureResult>,
    elapsed: Duration,
}

impl ComputedModule {
    pub fn module_name(&self) -> &'static str {
        self.module.module_name()
    }

    pub fn speed_group(&self) -> &'static str {
        self.speed_group
    }

    /// Results in declared identifier order
    pub fn results(&self) -> &[FeatureResult] {
        &self.results
    }

    /// Wall-clock time of `compute_feature_data`
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The live instance as its concrete type
    pub fn downcast_ref<T: FeatureModule>(&self) -> Option<&T> {
        self.module.as_any().downcast_ref::<T>()
    }
}

impl std::fmt::Debug for ComputedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedModule")
            .field("module_name", &self.module_name())
            .field("speed_group", &self.speed_group)
            .field("results", &self.results)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

/// A module dropped from the batch
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleFailure {
    pub module_name: &'static str,
    pub speed_group: &'static str,
    pub error: FeatureError,
    pub elapsed: Duration,
}

/// Everything one dispatch over an image produced
#[derive(Debug)]
pub struct QualityComputation {
    feature_ids: Vec<&'static str>,
    modules: Vec<ComputedModule>,
    failures: Vec<ModuleFailure>,
}

impl QualityComputation {
    /// Successful modules, in registration order
    pub fn modules(&self) -> &[ComputedModule] {
        &self.modules
    }

    /// Failed modules, in registration order
    pub fn failures(&self) -> &[ModuleFailure] {
        &self.failures
    }

    /// Every registered module succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure record of a module, if it failed
    pub fn failure(&self, module_name: &str) -> Option<&ModuleFailure> {
        self.failures.iter().find(|f| f.module_name == module_name)
    }

    /// Live instance of a module type, if it succeeded
    pub fn module<T: FeatureModule>(&self) -> Option<&T> {
        self.modules.iter().find_map(|m| m.downcast_ref::<T>())
    }

    /// Flattened results with provenance
    pub fn feature_data(&self) -> Vec<FeatureData> {
        self.modules
            .iter()
            .flat_map(|m| {
                let module_name = m.module_name();
                m.results.iter().map(move |r| FeatureData {
                    identifier: r.identifier,
                    value: r.value,
                    module_name,
                })
            })
            .collect()
    }

    /// Timing of every successful module
    ///
    /// Failed modules have no entry here; their elapsed time is kept in
    /// [`ModuleFailure::elapsed`].
    pub fn feature_speeds(&self) -> Vec<FeatureSpeed> {
        self.modules
            .iter()
            .map(|m| FeatureSpeed {
                group_identifier: m.speed_group,
                elapsed: m.elapsed,
            })
            .collect()
    }

    /// Actionable feedback of every successful module
    pub fn actionable_feedback(&self) -> Result<Vec<ActionableFeedback>, FeatureError> {
        let mut feedback = Vec::new();
        for module in &self.modules {
            feedback.extend(module.module.actionable_feedback()?);
        }
        Ok(feedback)
    }

    /// Values aligned with the full identifier schema
    ///
    /// Features of failed modules are `None`, so the vector keeps its
    /// positions whatever failed.
    pub fn feature_vector(&self) -> Vec<(&'static str, Option<f64>)> {
        self.feature_ids
            .iter()
            .map(|&id| {
                let value = self
                    .modules
                    .iter()
                    .flat_map(|m| m.results.iter())
                    .find(|r| r.identifier == id)
                    .map(|r| r.value);
                (id, value)
            })
            .collect()
    }
}

impl FeatureRegistry {
    /// Run every registered module against `image`
    pub fn compute_quality_features(&self, image: &FingerprintImage) -> QualityComputation {
        let deadline = self.config.module_deadline_ms.map(Duration::from_millis);
        let started = Instant::now();

        let outcomes: Vec<Result<ComputedModule, ModuleFailure>> = match self.config.execution {
            ExecutionMode::Sequential => self
                .modules
                .iter()
                .map(|r| run_module(r, image, deadline))
                .collect(),
            // Indexed collect keeps registration order
            ExecutionMode::Parallel => self
                .modules
                .par_iter()
                .map(|r| run_module(r, image, deadline))
                .collect(),
        };

        let mut modules = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(module) => modules.push(module),
                Err(failure) => failures.push(failure),
            }
        }

        info!(
            "Computed {} of {} modules on {}x{} image in {:?}",
            modules.len(),
            self.modules.len(),
            image.width(),
            image.height(),
            started.elapsed()
        );

        QualityComputation {
            feature_ids: self.all_quality_feature_ids(),
            modules,
            failures,
        }
    }

    /// Feature data straight from an image
    pub fn quality_feature_data(&self, image: &FingerprintImage) -> Vec<FeatureData> {
        self.compute_quality_features(image).feature_data()
    }

    /// Actionable feedback straight from an image
    pub fn actionable_quality_feedback(
        &self,
        image: &FingerprintImage,
    ) -> Result<Vec<ActionableFeedback>, FeatureError> {
        self.compute_quality_features(image).actionable_feedback()
    }
}

fn run_module(
    registration: &ModuleRegistration,
    image: &FingerprintImage,
    deadline: Option<Duration>,
) -> Result<ComputedModule, ModuleFailure> {
    let mut module = registration.instantiate();

    let start = Instant::now();
    let computed = module.compute_feature_data(image);
    let elapsed = start.elapsed();

    let outcome = computed.and_then(|results| {
        if let Some(deadline) = deadline {
            if elapsed > deadline {
                return Err(FeatureError::DeadlineExceeded {
                    module: registration.name(),
                    elapsed_ms: elapsed.as_millis() as u64,
                    deadline_ms: deadline.as_millis() as u64,
                });
            }
        }
        conform_to_declaration(registration, results)
    });

    match outcome {
        Ok(results) => {
            debug!(
                "Module {} produced {} features in {:?}",
                registration.name(),
                results.len(),
                elapsed
            );
            Ok(ComputedModule {
                module,
                speed_group: registration.speed_group(),
                results,
                elapsed,
            })
        }
        Err(error) => {
            warn!("Module {} dropped: {}", registration.name(), error);
            Err(ModuleFailure {
                module_name: registration.name(),
                speed_group: registration.speed_group(),
                error,
                elapsed,
            })
        }
    }
}

/// Check emitted identifiers against the declaration and put them in declared order
fn conform_to_declaration(
    registration: &ModuleRegistration,
    results: Vec<FeatureResult>,
) -> Result<Vec<FeatureResult>, FeatureError> {
    let declared = registration.feature_ids();

    let missing: Vec<String> = declared
        .iter()
        .filter(|&&id| !results.iter().any(|r| r.identifier == id))
        .map(|id| id.to_string())
        .collect();
    let unexpected: Vec<String> = results
        .iter()
        .enumerate()
        .filter(|&(i, r)| {
            !declared.contains(&r.identifier)
                || results[..i].iter().any(|p| p.identifier == r.identifier)
        })
        .map(|(_, r)| r.identifier.to_string())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(FeatureError::SchemaMismatch {
            module: registration.name(),
            missing,
            unexpected,
        });
    }

    Ok(declared
        .iter()
        .filter_map(|&id| results.iter().find(|r| r.identifier == id).copied())
        .collect())
}
