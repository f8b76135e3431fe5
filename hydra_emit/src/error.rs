use thiserror::Error;

/// Result type for serialization calls.
pub type HydraResult<T> = Result<T, HydraError>;

/// A static metadata authoring mistake found while resolving a scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The scope carries a term list and a single term at the same time.
    #[error("found both a term list and a single term in {scope}, use either one or the other")]
    ConflictingTermDeclarations { scope: String },

    /// Two entries of one term list share an output name.
    #[error("duplicate definition of term '{term}' in {scope}")]
    DuplicateTerm { scope: String, term: String },
}

#[derive(Debug, Error)]
pub enum HydraError {
    #[error("invalid JSON-LD metadata: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The field engine produced something other than an object for a bean.
    #[error("bean {type_name} did not serialize to a JSON object")]
    NotAnObject { type_name: String },

    #[error("no property filter registered under id '{0}'")]
    UnknownFilter(String),

    #[error("a metadata registry is already installed")]
    AlreadyInstalled,

    /// A field of the bean is itself named `@context` or `@type`.
    #[error("field '{key}' of {type_name} collides with the bean's JSON-LD metadata in a JSON value, use to_string instead")]
    MetadataKeyCollision { type_name: String, key: String },

    #[error("JSON-LD serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HydraError {
    /// Whether the bean's own metadata is invalid.
    ///
    /// A nested [`Hydra`](crate::Hydra) bean reports through serde's error
    /// channel, so its configuration errors arrive as `Serialization` and are
    /// not flagged here. The message still carries the configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, HydraError::Configuration(_))
    }
}
