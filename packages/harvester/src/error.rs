//! Error types for the harvester.
//!
//! `HarvesterError` covers both configuration mistakes (reported before any
//! I/O happens) and operational failures (transport, parsing, archive I/O).
//! The public partitioning entry point converts the latter into a
//! [`HarvestOutcome`](crate::types::HarvestOutcome) instead of returning them.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Endpoint is not an absolute http(s) URL.
    #[error("Invalid OAI endpoint URL: '{0}'. Expected an absolute http(s) URL")]
    InvalidEndpoint(String),

    /// Archive size limit must be at least one record.
    #[error("Invalid archive size: {0}. Expected at least 1 record per archive")]
    InvalidArchiveSize(usize),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Repository answered with something other than 200 OK.
    #[error("Failed to fetch records ({url}). Status Code: {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// All retry attempts for a transient failure were used up.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// Response body is not UTF-8 text.
    #[error("Response body is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// `completeListSize` attribute is not a non-negative integer.
    #[error("Invalid completeListSize value: '{0}'")]
    InvalidListSize(String),

    /// Writing a zip archive failed.
    #[error("Archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvesterError::InvalidEndpoint("ftp://example.org".to_string());
        assert!(err.to_string().contains("ftp://example.org"));
        assert!(err.to_string().contains("http(s)"));
    }

    #[test]
    fn test_unexpected_status_display() {
        let err = HarvesterError::UnexpectedStatus {
            url: "https://example.org/oai".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch records (https://example.org/oai). Status Code: 503"
        );
    }

    #[test]
    fn test_invalid_encoding_display() {
        let bytes = vec![b'a', 0xff];
        let err = std::str::from_utf8(&bytes).unwrap_err();
        let msg = HarvesterError::from(err).to_string();
        assert!(msg.starts_with("Response body is not valid UTF-8"), "{msg}");
    }

    #[test]
    fn test_invalid_list_size_display() {
        let err = HarvesterError::InvalidListSize("many".to_string());
        assert_eq!(err.to_string(), "Invalid completeListSize value: 'many'");
    }
}
