//! Unified error types for Slidesmith.
//!
//! The composition, packaging, and artifact layers all report through a single
//! error enum so callers can match on the failure kind: outline-shape failures
//! and write failures propagate to the request boundary, template failures are
//! resolved internally by falling back to the built-in theme, and token lookup
//! failures are independent of generation failures.
use thiserror::Error;

/// Main error type for Slidesmith operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Branded template file missing or malformed.
    ///
    /// Recoverable: callers compose via the built-in fallback theme instead.
    #[error("Invalid template: {0}")]
    TemplateInvalid(String),

    /// The outline violates the content contract (empty title, slide count
    /// out of bounds, slide without bullets).
    #[error("Invalid outline: {0}")]
    OutlineInvalid(String),

    /// Disk or serialization failure while producing the package.
    #[error("Package write failed: {0}")]
    WriteFailed(String),

    /// Retrieval of an unknown or expired download token.
    #[error("Artifact not found or expired: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),
}

/// Result type for Slidesmith operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is resolved internally by the composition pipeline
    /// rather than surfaced to the request boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::TemplateInvalid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_invalid_is_recoverable() {
        assert!(Error::TemplateInvalid("missing".into()).is_recoverable());
        assert!(!Error::OutlineInvalid("empty".into()).is_recoverable());
        assert!(!Error::NotFound("token".into()).is_recoverable());
    }

    #[test]
    fn test_error_display_carries_cause() {
        let err = Error::WriteFailed("disk full".into());
        assert!(err.to_string().contains("disk full"));
    }
}
