//! Error types for jobdeck.

use thiserror::Error;

/// Result type alias using jobdeck's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single remote fetch attempt.
///
/// Cloneable so that every consumer attached to the same in-flight fetch
/// observes the identical error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No response was received (connection refused, timeout, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response carrying a human-readable description.
    #[error("Remote error ({status}): {description}")]
    Remote { status: u16, description: String },

    /// Response body was not in the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::Remote { .. } => "remote",
            FetchError::Decode(_) => "decode",
        }
    }
}

/// Core error type for jobdeck operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Remote fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Durable store rejected a read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Stored value could not be decoded
    #[error("Persistence decode error: {0}")]
    PersistenceDecode(String),

    /// A required collaborator was not supplied at construction time
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_remote() {
        let err = FetchError::Remote {
            status: 404,
            description: "Job not found".to_string(),
        };
        assert_eq!(err.to_string(), "Remote error (404): Job not found");
    }

    #[test]
    fn test_fetch_error_kind() {
        assert_eq!(FetchError::Network("refused".into()).kind(), "network");
        assert_eq!(FetchError::Decode("bad".into()).kind(), "decode");
        assert_eq!(
            FetchError::Remote {
                status: 500,
                description: String::new()
            }
            .kind(),
            "remote"
        );
    }

    #[test]
    fn test_error_from_fetch_error_is_transparent() {
        let err: Error = FetchError::Network("timed out".to_string()).into();
        assert_eq!(err.to_string(), "Network error: timed out");
    }

    #[test]
    fn test_error_display_missing_dependency() {
        let err = Error::MissingDependency("JobApi");
        assert_eq!(err.to_string(), "Missing dependency: JobApi");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<Vec<u64>>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
