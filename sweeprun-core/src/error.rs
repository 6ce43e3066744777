//! Error types for the sweeprun-core crate.

use thiserror::Error;

/// Boxed error returned by algorithm implementations.
pub type AlgorithmError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for sweep operations.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] Box<figment::Error>),

    #[error("Algorithm '{algorithm}' failed for [{combination}]: {source}")]
    Algorithm {
        algorithm: String,
        combination: String,
        #[source]
        source: AlgorithmError,
    },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl SweepError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn algorithm(
        algorithm: impl Into<String>,
        combination: impl Into<String>,
        source: AlgorithmError,
    ) -> Self {
        Self::Algorithm {
            algorithm: algorithm.into(),
            combination: combination.into(),
            source,
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_error_message() {
        let err = SweepError::algorithm("rhc", "Restarts:[3]", "population collapsed".into());
        assert_eq!(
            err.to_string(),
            "Algorithm 'rhc' failed for [Restarts:[3]]: population collapsed"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SweepError = io.into();
        assert!(matches!(err, SweepError::Io(_)));
    }
}
