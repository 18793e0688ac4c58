//! Configuration constants and validation functions for the harvester.

use reqwest::Url;

use crate::error::{HarvesterError, Result};

/// XML namespace of OAI-PMH 2.0 responses.
pub const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";

/// Metadata format requested when the caller does not pick one.
pub const DEFAULT_METADATA_PREFIX: &str = "oai_dc";

/// Default maximum number of XML entries per archive.
pub const DEFAULT_MAX_FILES_IN_ARCHIVE: usize = 50_000;

/// Emit a progress log line every this many records.
pub const PROGRESS_INTERVAL: usize = 100;

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Maximum length of a sanitized filename.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// HTTP timeout in seconds.
///
/// OAI-PMH repositories often build large `ListRecords` pages on the fly,
/// so this is generous.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts per request (first try included).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Validate an OAI-PMH endpoint URL.
///
/// # Returns
/// * `Ok(())` if the URL is absolute and uses http or https
/// * `Err(HarvesterError::InvalidEndpoint)` otherwise
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_endpoint;
///
/// assert!(validate_endpoint("https://example.org/oai").is_ok());
/// assert!(validate_endpoint("example.org/oai").is_err());
/// assert!(validate_endpoint("ftp://example.org/oai").is_err());
/// ```
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    match Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(HarvesterError::InvalidEndpoint(endpoint.to_string())),
    }
}

/// Validate the per-archive record limit.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_max_files_in_archive;
///
/// assert!(validate_max_files_in_archive(50_000).is_ok());
/// assert!(validate_max_files_in_archive(0).is_err());
/// ```
pub fn validate_max_files_in_archive(max_files: usize) -> Result<()> {
    if max_files == 0 {
        return Err(HarvesterError::InvalidArchiveSize(max_files));
    }
    Ok(())
}
