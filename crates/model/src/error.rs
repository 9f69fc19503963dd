use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by the model collaborator
#[derive(Error, Debug)]
pub enum ModelError {
    /// IO error while reading or writing a model file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Model document could not be (de)serialized
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reaction bounds are inverted or not finite
    #[error("Invalid bounds for reaction {id}: lower={lower}, upper={upper}")]
    InvalidBounds { id: String, lower: f64, upper: f64 },

    #[error("Reaction not found: {0}")]
    ReactionNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    /// Create a reaction-not-found error
    pub fn reaction_not_found(id: impl Into<String>) -> Self {
        Self::ReactionNotFound(id.into())
    }
}
