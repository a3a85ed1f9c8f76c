use thiserror::Error;

/// Errors reported by the particle field to its host.
///
/// Nothing in the simulation itself fails; these cover the boundary:
/// acquiring a paint surface, parsing configuration, and validating
/// host-supplied coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// The drawing surface exists but its 2D paint context could not be acquired.
    /// Fatal for the field; the host keeps running without it.
    #[error("2D paint context unavailable: {0}")]
    ContextUnavailable(String),
    /// The drawing surface itself could not be created or attached.
    #[error("drawing surface error: {0}")]
    Surface(String),
    /// A host-supplied point had a non-finite coordinate.
    #[error("invalid point ({x}, {y})")]
    InvalidPoint { x: f32, y: f32 },
    /// Configuration parsed but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Configuration JSON could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(String),
}

impl From<serde_json::Error> for FieldError {
    fn from(err: serde_json::Error) -> Self {
        FieldError::ConfigParse(err.to_string())
    }
}
