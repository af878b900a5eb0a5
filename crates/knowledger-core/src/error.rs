//! Error types for knowledger.

use thiserror::Error;

/// Result type alias using knowledger's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for knowledger operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ibit not found
    #[error("Ibit not found: {0}")]
    IbitNotFound(uuid::Uuid),

    /// Entity not found for the tenant
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Tenant not found
    #[error("Tenant not found: {0}")]
    TenantNotFound(uuid::Uuid),

    /// Metadata extraction failed (external call or unparsable response).
    /// Non-fatal: ingestion degrades to empty metadata.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Audio transcription failed
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Attempt to merge an entity into itself
    #[error("Cannot merge entity '{0}' into itself")]
    SelfMerge(String),

    /// Merge would create an alias chain (source or target already redirects)
    #[error("Alias chain rejected: {0}")]
    AliasChain(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// True for failures that degrade the result instead of aborting the
    /// operation (extraction never aborts ingestion).
    pub fn is_degradable(&self) -> bool {
        matches!(self, Error::Extraction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_ibit_not_found() {
        let id = Uuid::nil();
        let err = Error::IbitNotFound(id);
        assert_eq!(err.to_string(), format!("Ibit not found: {}", id));
    }

    #[test]
    fn test_error_display_entity_not_found() {
        let err = Error::EntityNotFound("Alice".to_string());
        assert_eq!(err.to_string(), "Entity not found: Alice");
    }

    #[test]
    fn test_error_display_self_merge() {
        let err = Error::SelfMerge("Berlin".to_string());
        assert_eq!(err.to_string(), "Cannot merge entity 'Berlin' into itself");
    }

    #[test]
    fn test_error_display_alias_chain() {
        let err = Error::AliasChain("target 'NYC' is already an alias".to_string());
        assert!(err.to_string().starts_with("Alias chain rejected:"));
    }

    #[test]
    fn test_error_display_extraction() {
        let err = Error::Extraction("model timeout".to_string());
        assert_eq!(err.to_string(), "Extraction error: model timeout");
    }

    #[test]
    fn test_extraction_is_degradable() {
        assert!(Error::Extraction("boom".to_string()).is_degradable());
        assert!(!Error::Internal("boom".to_string()).is_degradable());
        assert!(!Error::InvalidInput("boom".to_string()).is_degradable());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
