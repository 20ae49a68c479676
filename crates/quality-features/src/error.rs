//! Feature, Registration and Configuration Error Types

use thiserror::Error;

/// Errors raised by a feature module or recorded by the dispatcher
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Image violates a structural precondition of the module
    #[error("{module}: malformed input: {reason}")]
    MalformedInput { module: &'static str, reason: String },

    /// Derived state queried before a successful computation
    #[error("{module}: {accessor} is not available before a successful computation")]
    UninitializedState {
        module: &'static str,
        accessor: &'static str,
    },

    /// Computation finished after the configured deadline
    #[error("{module}: computation took {elapsed_ms}ms, deadline is {deadline_ms}ms")]
    DeadlineExceeded {
        module: &'static str,
        elapsed_ms: u64,
        deadline_ms: u64,
    },

    /// Emitted identifiers differ from the declared identifier set
    #[error("{module}: emitted features do not match declaration (missing {missing:?}, unexpected {unexpected:?})")]
    SchemaMismatch {
        module: &'static str,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

impl FeatureError {
    /// Shorthand for a `MalformedInput` error
    pub fn malformed(module: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            module,
            reason: reason.into(),
        }
    }
}

/// Errors detected while registering modules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Module {0} is already registered")]
    DuplicateModule(&'static str),

    #[error("Module {0} declares no feature identifiers")]
    EmptyFeatureIds(&'static str),

    #[error("Module {module} declares {id} more than once")]
    DuplicateIdWithinModule {
        module: &'static str,
        id: &'static str,
    },

    #[error("Feature {id} of {module} is already declared by {existing}")]
    OverlappingFeatureId {
        id: &'static str,
        module: &'static str,
        existing: &'static str,
    },

    #[error("Actionable identifier {id} is not one of the features of {module}")]
    ActionableNotDeclared {
        module: &'static str,
        id: &'static str,
    },
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
