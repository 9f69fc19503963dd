use ensemble_model::{ComponentKind, ModelError};
use thiserror::Error;

/// Result type for ensemble operations
pub type Result<T> = std::result::Result<T, EnsembleError>;

/// Errors that abort an ensemble construction or merge
#[derive(Error, Debug)]
pub enum EnsembleError {
    /// Invalid join method or size, unusable input models, empty required input
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A component kind without comparison attributes reached feature resolution
    #[error("Unsupported feature type '{kind}' for component {component_id}: only reactions are currently supported")]
    UnsupportedFeatureType {
        kind: ComponentKind,
        component_id: String,
    },

    /// A member is active for two variants of the same component
    #[error("Inconsistent state: member {member_id} is active for features {first} and {second} of component {component_id}")]
    InconsistentState {
        member_id: String,
        component_id: String,
        first: String,
        second: String,
    },

    /// A feature refers to a component missing from the base structure
    #[error("Component {0} not found in base model")]
    ComponentNotFound(String),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl EnsembleError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an unsupported feature type error
    pub fn unsupported(kind: ComponentKind, component_id: impl Into<String>) -> Self {
        Self::UnsupportedFeatureType {
            kind,
            component_id: component_id.into(),
        }
    }
}
