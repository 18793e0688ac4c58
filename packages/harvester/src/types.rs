//! Core data types for the harvester.

use serde::Serialize;

use crate::config::DEFAULT_METADATA_PREFIX;

/// One logical `ListRecords` query against an OAI-PMH repository.
///
/// Fixed for the lifetime of a harvest client; only the resumption token
/// changes between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestQuery {
    /// Base URL of the OAI-PMH endpoint.
    pub endpoint: String,

    /// Requested metadata format (e.g., "oai_dc").
    pub metadata_prefix: String,

    /// Lower datestamp bound, passed through unchanged.
    pub from: Option<String>,

    /// Upper datestamp bound, passed through unchanged.
    pub until: Option<String>,

    /// Set specifier.
    pub set: Option<String>,
}

impl HarvestQuery {
    /// Query for all records of `endpoint` in the default metadata format.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            metadata_prefix: DEFAULT_METADATA_PREFIX.to_string(),
            from: None,
            until: None,
            set: None,
        }
    }

    #[must_use]
    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }

    #[must_use]
    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }
}

/// Continuation cursor taken from the latest response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    /// Token text; `None` when the element was present but empty.
    pub value: Option<String>,

    /// Raw `completeListSize` attribute, if any.
    pub complete_list_size: Option<String>,
}

impl ResumptionToken {
    /// Token text if it can be used to request another page.
    pub fn next_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// A single harvested record, already serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// `header/identifier` text, if the header carries one.
    pub identifier: Option<String>,

    /// `header/datestamp` text.
    pub datestamp: Option<String>,

    /// Header is marked `status="deleted"`.
    pub deleted: bool,

    /// The `record` element as a standalone UTF-8 XML document.
    pub xml: Vec<u8>,
}

/// How a partitioning run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HarvestOutcome {
    /// Every record was streamed and the archives are on disk.
    Complete,

    /// The repository reported zero records; nothing was written.
    Empty,

    /// The total count could not be determined; nothing was written.
    CountFailed { error: String },

    /// Streaming or writing failed; all produced archives were deleted.
    RolledBack { error: String },
}

impl HarvestOutcome {
    /// `true` for the two success terminals.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Complete | Self::Empty)
    }
}

/// Report returned by [`harvest_to_archives`](crate::harvester::harvest_to_archives).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestResult {
    /// Total reported by the repository.
    pub num_found: u64,

    /// Records written to an archive.
    pub num_received: u64,

    /// Archive filenames (relative to the destination), in creation order.
    pub filenames: Vec<String>,

    pub outcome: HarvestOutcome,
}

impl HarvestResult {
    /// Zero-valued result for a run that never started streaming.
    #[must_use]
    pub fn empty(outcome: HarvestOutcome) -> Self {
        Self {
            num_found: 0,
            num_received: 0,
            filenames: Vec::new(),
            outcome,
        }
    }
}

/// Knobs of the partitioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Maximum number of XML entries per archive.
    pub max_files_in_archive: usize,

    /// Archive name prefix; derived from the current time when `None`.
    pub filename_prefix: Option<String>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            max_files_in_archive: crate::config::DEFAULT_MAX_FILES_IN_ARCHIVE,
            filename_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_query_defaults() {
        let query = HarvestQuery::new("https://example.org/oai");
        assert_eq!(query.metadata_prefix, "oai_dc");
        assert!(query.from.is_none());
        assert!(query.until.is_none());
        assert!(query.set.is_none());
    }

    #[test]
    fn test_harvest_query_builder() {
        let query = HarvestQuery::new("https://example.org/oai")
            .with_metadata_prefix("marcxml")
            .with_from("2024-01-01")
            .with_until("2024-12-31")
            .with_set("theses");
        assert_eq!(query.metadata_prefix, "marcxml");
        assert_eq!(query.from.as_deref(), Some("2024-01-01"));
        assert_eq!(query.until.as_deref(), Some("2024-12-31"));
        assert_eq!(query.set.as_deref(), Some("theses"));
    }

    #[test]
    fn test_resumption_token_next_value() {
        let token = ResumptionToken {
            value: Some("abc".to_string()),
            complete_list_size: None,
        };
        assert_eq!(token.next_value(), Some("abc"));

        let empty = ResumptionToken {
            value: None,
            complete_list_size: Some("10".to_string()),
        };
        assert_eq!(empty.next_value(), None);

        let blank = ResumptionToken {
            value: Some("  \n ".to_string()),
            complete_list_size: None,
        };
        assert_eq!(blank.next_value(), None);
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(HarvestOutcome::Complete.is_success());
        assert!(HarvestOutcome::Empty.is_success());
        assert!(!HarvestOutcome::CountFailed {
            error: "x".to_string()
        }
        .is_success());
        assert!(!HarvestOutcome::RolledBack {
            error: "x".to_string()
        }
        .is_success());
    }

    #[test]
    fn test_archive_options_default() {
        let options = ArchiveOptions::default();
        assert_eq!(options.max_files_in_archive, 50_000);
        assert!(options.filename_prefix.is_none());
    }
}
