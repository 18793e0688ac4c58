//! OAI Harvester - snapshot OAI-PMH repository metadata into zip archives.
//!
//! This crate harvests records from a repository implementing the Open
//! Archives Initiative Protocol for Metadata Harvesting and stores every
//! record as its own XML file, bundled into zip archives of bounded size.
//!
//! # Example
//!
//! ```
//! use oai_harvester::filename::sanitize_identifier;
//! use oai_harvester::types::HarvestQuery;
//!
//! let query = HarvestQuery::new("https://example.org/oai").with_set("theses");
//! assert_eq!(query.metadata_prefix, "oai_dc");
//! assert_eq!(sanitize_identifier("oai:example.org:42"), "oai_example.org_42");
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants and validation
//! - [`types`]: Core data types (query, record, result)
//! - [`error`]: Error types and Result alias
//! - [`http`]: Transport trait and reqwest implementation
//! - [`filename`]: Filesystem-safe names for archives and entries
//! - [`xml`]: XML navigation and serialization utilities
//! - [`oai`]: OAI-PMH client and resumption-token pagination
//! - [`archive`]: Zip archive writer
//! - [`harvester`]: Archive partitioning of a harvest run
//! - [`cli`]: Command-line interface

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod filename;
pub mod harvester;
pub mod http;
pub mod oai;
pub mod types;
pub mod xml;

// Re-export main functions
pub use harvester::{harvest_to_archives, harvest_with_transport};

// Re-export commonly used items
pub use error::{HarvesterError, Result};
pub use http::{HttpTransport, Transport};
pub use oai::OaiClient;
pub use types::{ArchiveOptions, HarvestOutcome, HarvestQuery, HarvestResult, Record};
