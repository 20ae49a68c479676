//! Feature Module Registry
//!
//! Holds one factory per module type together with the type's declared
//! identifiers. Identifier collisions would silently corrupt the feature
//! vector schema, so they are rejected when a module is registered.
//! Actionable identifiers must be a subset of the module's own features.

use crate::config::{DispatcherConfig, QualityConfig};
use crate::features::{
    BlockStatisticFeature, FrequencyDomainFeature, LocalContrastFeature, MuFeature,
    RegionOfInterestFeature,
};
use crate::module::{FeatureDescriptor, FeatureModule};
use crate::RegistrationError;
use tracing::{debug, info};

type ModuleFactory = Box<dyn Fn() -> Box<dyn FeatureModule> + Send + Sync>;

/// A registered module type
pub struct ModuleRegistration {
    name: &'static str,
    speed_group: &'static str,
    feature_ids: &'static [&'static str],
    actionable_ids: &'static [&'static str],
    factory: ModuleFactory,
}

impl ModuleRegistration {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn speed_group(&self) -> &'static str {
        self.speed_group
    }

    pub fn feature_ids(&self) -> &'static [&'static str] {
        self.feature_ids
    }

    pub fn actionable_ids(&self) -> &'static [&'static str] {
        self.actionable_ids
    }

    /// Fresh instance for one computation
    pub(crate) fn instantiate(&self) -> Box<dyn FeatureModule> {
        (self.factory)()
    }
}

impl std::fmt::Debug for ModuleRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistration")
            .field("name", &self.name)
            .field("speed_group", &self.speed_group)
            .field("feature_ids", &self.feature_ids)
            .field("actionable_ids", &self.actionable_ids)
            .finish_non_exhaustive()
    }
}

/// Ordered set of feature modules and the dispatcher settings to run them
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    pub(crate) config: DispatcherConfig,
    pub(crate) modules: Vec<ModuleRegistration>,
}

impl FeatureRegistry {
    /// Empty registry
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
        }
    }

    /// Registry with every built-in module, in schema order
    pub fn with_default_modules(config: &QualityConfig) -> Result<Self, RegistrationError> {
        let mut registry = Self::new(config.dispatcher.clone());

        let mu = config.mu.clone();
        let block_statistic = config.block_statistic.clone();
        let local_contrast = config.local_contrast.clone();
        let region_of_interest = config.region_of_interest.clone();
        let frequency_domain = config.frequency_domain.clone();

        registry
            .register(move || MuFeature::new(mu.clone()))?
            .register(move || BlockStatisticFeature::new(block_statistic.clone()))?
            .register(move || LocalContrastFeature::new(local_contrast.clone()))?
            .register(move || RegionOfInterestFeature::new(region_of_interest.clone()))?
            .register(move || FrequencyDomainFeature::new(frequency_domain.clone()))?;

        info!(
            "Feature registry created with {} modules, {} features",
            registry.modules.len(),
            registry.all_quality_feature_ids().len()
        );
        Ok(registry)
    }

    /// Register a module type, built by `factory` for every computation
    pub fn register<M, F>(&mut self, factory: F) -> Result<&mut Self, RegistrationError>
    where
        M: FeatureDescriptor,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let name = M::MODULE_NAME;

        if self.modules.iter().any(|m| m.name == name) {
            return Err(RegistrationError::DuplicateModule(name));
        }
        if M::FEATURE_IDS.is_empty() {
            return Err(RegistrationError::EmptyFeatureIds(name));
        }

        for ids in [M::FEATURE_IDS, M::ACTIONABLE_IDS] {
            if let Some(id) = first_duplicate(ids) {
                return Err(RegistrationError::DuplicateIdWithinModule { module: name, id });
            }
        }

        for &id in M::FEATURE_IDS {
            if let Some(existing) = self.modules.iter().find(|m| m.feature_ids.contains(&id)) {
                return Err(RegistrationError::OverlappingFeatureId {
                    id,
                    module: name,
                    existing: existing.name,
                });
            }
        }
        if let Some(&id) = M::ACTIONABLE_IDS
            .iter()
            .find(|&&id| !M::FEATURE_IDS.contains(&id))
        {
            return Err(RegistrationError::ActionableNotDeclared { module: name, id });
        }

        debug!(
            "Registered module {} ({} features, speed group {})",
            name,
            M::FEATURE_IDS.len(),
            M::SPEED_GROUP
        );

        self.modules.push(ModuleRegistration {
            name,
            speed_group: M::SPEED_GROUP,
            feature_ids: M::FEATURE_IDS,
            actionable_ids: M::ACTIONABLE_IDS,
            factory: Box::new(move || Box::new(factory()) as Box<dyn FeatureModule>),
        });
        Ok(self)
    }

    /// Registered modules, in registration order
    pub fn modules(&self) -> &[ModuleRegistration] {
        &self.modules
    }

    pub fn dispatcher_config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Every feature identifier, registration order then declared order
    ///
    /// Registration rejects overlaps, so the list is duplicate free.
    pub fn all_quality_feature_ids(&self) -> Vec<&'static str> {
        self.modules
            .iter()
            .flat_map(|m| m.feature_ids.iter().copied())
            .collect()
    }

    /// Distinct speed groups, in order of first registration
    pub fn all_speed_feature_groups(&self) -> Vec<&'static str> {
        let mut groups: Vec<&'static str> = Vec::new();
        for module in &self.modules {
            if !groups.contains(&module.speed_group) {
                groups.push(module.speed_group);
            }
        }
        groups
    }

    /// Every actionable feedback identifier
    ///
    /// Always a subset of [`all_quality_feature_ids`](Self::all_quality_feature_ids).
    pub fn all_actionable_identifiers(&self) -> Vec<&'static str> {
        self.modules
            .iter()
            .flat_map(|m| m.actionable_ids.iter().copied())
            .collect()
    }
}

fn first_duplicate(ids: &'static [&'static str]) -> Option<&'static str> {
    ids.iter()
        .enumerate()
        .find(|&(i, id)| ids[..i].contains(id))
        .map(|(_, id)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{BlockStatisticConfig, MuConfig};
    use crate::module::FeatureResult;
    use crate::FeatureError;
    use fingerprint_image::FingerprintImage;
    use std::any::Any;

    /// Declares an ID that `MuFeature` already owns
    struct ClashingFeature;

    impl FeatureModule for ClashingFeature {
        fn module_name(&self) -> &'static str {
            Self::MODULE_NAME
        }

        fn compute_feature_data(
            &mut self,
            _image: &FingerprintImage,
        ) -> Result<Vec<FeatureResult>, FeatureError> {
            Ok(vec![FeatureResult::new("Mu", 0.0)])
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl FeatureDescriptor for ClashingFeature {
        const MODULE_NAME: &'static str = "Clashing";
        const SPEED_GROUP: &'static str = "Clashing";
        const FEATURE_IDS: &'static [&'static str] = &["Mu"];
    }

    /// Identifier declarations for registration checks
    trait Declaration: Send + Sync + 'static {
        const NAME: &'static str;
        const IDS: &'static [&'static str];
        const ACTIONABLE: &'static [&'static str] = &[];
    }

    struct EmptyIds;
    impl Declaration for EmptyIds {
        const NAME: &'static str = "EmptyIds";
        const IDS: &'static [&'static str] = &[];
    }

    struct RepeatedIds;
    impl Declaration for RepeatedIds {
        const NAME: &'static str = "RepeatedIds";
        const IDS: &'static [&'static str] = &["X", "X"];
    }

    struct RepeatedActionable;
    impl Declaration for RepeatedActionable {
        const NAME: &'static str = "RepeatedActionable";
        const IDS: &'static [&'static str] = &["Y"];
        const ACTIONABLE: &'static [&'static str] = &["Y", "Y"];
    }

    struct ForeignActionable;
    impl Declaration for ForeignActionable {
        const NAME: &'static str = "ForeignActionable";
        const IDS: &'static [&'static str] = &["Foreign"];
        const ACTIONABLE: &'static [&'static str] = &["Mu_Sigma"];
    }

    /// Module that emits zeros for whatever `D` declares
    struct TestFeature<D>(std::marker::PhantomData<D>);

    impl<D> TestFeature<D> {
        fn new() -> Self {
            Self(std::marker::PhantomData)
        }
    }

    impl<D: Declaration> FeatureModule for TestFeature<D> {
        fn module_name(&self) -> &'static str {
            D::NAME
        }

        fn compute_feature_data(
            &mut self,
            _image: &FingerprintImage,
        ) -> Result<Vec<FeatureResult>, FeatureError> {
            Ok(D::IDS.iter().map(|&id| FeatureResult::new(id, 0.0)).collect())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl<D: Declaration> FeatureDescriptor for TestFeature<D> {
        const MODULE_NAME: &'static str = D::NAME;
        const SPEED_GROUP: &'static str = "Test";
        const FEATURE_IDS: &'static [&'static str] = D::IDS;
        const ACTIONABLE_IDS: &'static [&'static str] = D::ACTIONABLE;
    }

    #[test]
    fn test_default_registry_order() {
        let registry = FeatureRegistry::with_default_modules(&QualityConfig::default()).unwrap();
        let names: Vec<_> = registry.modules().iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["Mu", "BlockStatistic", "LocalContrast", "RegionOfInterest", "FrequencyDomain"]
        );

        let ids = registry.all_quality_feature_ids();
        assert_eq!(&ids[..4], &["MMB", "Mu", "Mu_Sigma", "BlockMean_Sigma"]);
        assert_eq!(ids.len(), 3 + 1 + 12 + 3 + 12);
    }

    #[test]
    fn test_speed_groups_deduplicated() {
        let registry = FeatureRegistry::with_default_modules(&QualityConfig::default()).unwrap();
        assert_eq!(
            registry.all_speed_feature_groups(),
            vec!["Contrast", "LocalContrast", "RegionOfInterest", "FrequencyDomain"]
        );
    }

    #[test]
    fn test_actionable_identifiers() {
        let registry = FeatureRegistry::with_default_modules(&QualityConfig::default()).unwrap();
        assert_eq!(
            registry.all_actionable_identifiers(),
            vec!["Mu", "Mu_Sigma", "RegionOfInterest_Area"]
        );
        let features = registry.all_quality_feature_ids();
        assert!(registry
            .all_actionable_identifiers()
            .iter()
            .all(|id| features.contains(id)));
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut registry = FeatureRegistry::default();
        registry
            .register(|| BlockStatisticFeature::new(BlockStatisticConfig::default()))
            .unwrap();
        let err = registry
            .register(|| BlockStatisticFeature::new(BlockStatisticConfig { block_size: 8 }))
            .unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateModule("BlockStatistic"));
        assert_eq!(registry.modules().len(), 1);
    }

    #[test]
    fn test_overlapping_feature_id_rejected() {
        let mut registry = FeatureRegistry::default();
        registry.register(|| MuFeature::new(MuConfig::default())).unwrap();
        let err = registry.register(|| ClashingFeature).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::OverlappingFeatureId {
                id: "Mu",
                module: "Clashing",
                existing: "Mu"
            }
        );
        assert_eq!(registry.all_quality_feature_ids(), vec!["MMB", "Mu", "Mu_Sigma"]);
    }

    #[test]
    fn test_empty_feature_ids_rejected() {
        let mut registry = FeatureRegistry::default();
        registry.register(|| MuFeature::new(MuConfig::default())).unwrap();
        let err = registry.register(|| TestFeature::<EmptyIds>::new()).unwrap_err();
        assert_eq!(err, RegistrationError::EmptyFeatureIds("EmptyIds"));
        assert_eq!(registry.modules().len(), 1);
    }

    #[test]
    fn test_repeated_feature_id_rejected() {
        let mut registry = FeatureRegistry::default();
        let err = registry.register(|| TestFeature::<RepeatedIds>::new()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateIdWithinModule {
                module: "RepeatedIds",
                id: "X"
            }
        );
        assert!(registry.modules().is_empty());
    }

    #[test]
    fn test_repeated_actionable_id_rejected() {
        let mut registry = FeatureRegistry::default();
        let err = registry
            .register(|| TestFeature::<RepeatedActionable>::new())
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::DuplicateIdWithinModule {
                module: "RepeatedActionable",
                id: "Y"
            }
        );
        assert!(registry.modules().is_empty());
    }

    #[test]
    fn test_actionable_id_outside_features_rejected() {
        let mut registry = FeatureRegistry::default();
        registry.register(|| MuFeature::new(MuConfig::default())).unwrap();
        // Borrows Mu's actionable identifier without computing that feature
        let err = registry
            .register(|| TestFeature::<ForeignActionable>::new())
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::ActionableNotDeclared {
                module: "ForeignActionable",
                id: "Mu_Sigma"
            }
        );
        assert_eq!(registry.modules().len(), 1);
        assert_eq!(registry.all_actionable_identifiers(), vec!["Mu", "Mu_Sigma"]);
    }

    #[test]
    fn test_first_duplicate() {
        assert_eq!(first_duplicate(&["a", "b", "a"]), Some("a"));
        assert_eq!(first_duplicate(&["a", "b"]), None);
    }
}
