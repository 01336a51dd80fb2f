use thiserror::Error;

/// Result type for dqnet operations
pub type Result<T> = std::result::Result<T, DqnetError>;

/// Main error type for the dqnet library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DqnetError {
    /// Vector width or network topology does not line up
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid hyperparameter or configuration field
    #[error("Invalid configuration '{name}': {reason}")]
    InvalidConfig {
        name: String,
        reason: String,
    },

    /// Action index outside the action space
    #[error("Invalid action {action}: must be less than {action_count}")]
    InvalidAction {
        action: usize,
        action_count: usize,
    },

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for DqnetError {
    fn from(err: std::io::Error) -> Self {
        DqnetError::Io(err.to_string())
    }
}

impl From<bincode::Error> for DqnetError {
    fn from(err: bincode::Error) -> Self {
        DqnetError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DqnetError {
    fn from(err: serde_json::Error) -> Self {
        DqnetError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl DqnetError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnetError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_config<S: Into<String>>(name: S, reason: S) -> Self {
        DqnetError::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a vector-width mismatch.
    pub(crate) fn width(what: &str, expected: usize, actual: usize) -> Self {
        DqnetError::dimension_mismatch(
            format!("{} of length {}", what, expected),
            format!("length {}", actual),
        )
    }
}
