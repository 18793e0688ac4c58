//! Main harvester service: stream records into size-bounded archives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::archive::{archive_name, ArchiveWriter};
use crate::config::{validate_endpoint, validate_max_files_in_archive, PROGRESS_INTERVAL};
use crate::error::{HarvesterError, Result};
use crate::filename::{sanitize_identifier, sanitize_timestamp};
use crate::http::{HttpTransport, Transport};
use crate::oai::OaiClient;
use crate::types::{ArchiveOptions, HarvestOutcome, HarvestQuery, HarvestResult};

/// Harvest `query` into zip archives under `destination`.
///
/// Each record becomes one `<sanitized-identifier>.xml` entry; a new archive
/// `<prefix>-<seq:03>.zip` is started every `max_files_in_archive` records.
///
/// # Returns
/// * `Err` only for invalid configuration (endpoint, archive size) or when
///   the destination directory cannot be created
/// * `Ok(HarvestResult)` otherwise; failures while counting or streaming are
///   reported through [`HarvestResult::outcome`], and a failed stream leaves
///   no archives behind
pub fn harvest_to_archives(
    query: &HarvestQuery,
    destination: &Path,
    options: &ArchiveOptions,
) -> Result<HarvestResult> {
    validate_endpoint(&query.endpoint)?;
    validate_max_files_in_archive(options.max_files_in_archive)?;

    let transport = HttpTransport::new()?;
    harvest_with_transport(query, transport, destination, options)
}

/// [`harvest_to_archives`] over an arbitrary transport.
pub fn harvest_with_transport<T: Transport>(
    query: &HarvestQuery,
    transport: T,
    destination: &Path,
    options: &ArchiveOptions,
) -> Result<HarvestResult> {
    validate_max_files_in_archive(options.max_files_in_archive)?;
    fs::create_dir_all(destination)?;

    let started = Local::now().naive_local();
    let endpoint = query.endpoint.as_str();
    let mut client = OaiClient::new(query.clone(), transport);

    let num_found = match client.count_total() {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(endpoint, error = %e, "Failed to determine record count");
            return Ok(HarvestResult::empty(HarvestOutcome::CountFailed {
                error: e.to_string(),
            }));
        }
    };

    tracing::info!(endpoint, found = num_found, "Records found");

    if num_found == 0 {
        return Ok(HarvestResult::empty(HarvestOutcome::Empty));
    }

    let prefix = options
        .filename_prefix
        .clone()
        .unwrap_or_else(|| sanitize_timestamp(&started));

    let mut partitioner = Partitioner {
        destination: destination.to_path_buf(),
        prefix,
        max_files_in_archive: options.max_files_in_archive,
        sequence: 0,
        current: None,
        result: HarvestResult {
            num_found,
            ..HarvestResult::empty(HarvestOutcome::Complete)
        },
    };

    match partitioner.run(&mut client) {
        Ok(()) => Ok(partitioner.result),
        Err(e) => {
            tracing::error!(
                endpoint,
                received = partitioner.result.num_received,
                found = num_found,
                error = %e,
                "Harvest failed, removing archives"
            );
            Ok(partitioner.rollback(e.to_string()))
        }
    }
}

/// Rolls records over into numbered archives. At most one archive is open.
struct Partitioner {
    destination: PathBuf,
    prefix: String,
    max_files_in_archive: usize,
    sequence: u32,
    current: Option<ArchiveWriter>,
    result: HarvestResult,
}

impl Partitioner {
    fn run<T: Transport>(&mut self, client: &mut OaiClient<T>) -> Result<()> {
        let endpoint = client.query().endpoint.clone();
        let num_found = self.result.num_found;
        let mut written: usize = 0;

        self.open_next()?;

        for (position, record) in client.stream_records().enumerate() {
            let record = record?;

            if (position + 1) % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    endpoint = %endpoint,
                    received = self.result.num_received,
                    found = num_found,
                    "Harvest progress"
                );
            }

            let Some(identifier) = record.identifier.as_deref() else {
                tracing::debug!(position, "Skipping record without identifier");
                continue;
            };

            if written > 0 && written % self.max_files_in_archive == 0 {
                self.close_current()?;
                self.open_next()?;
            }

            let entry = self
                .writer()?
                .write_entry(&sanitize_identifier(identifier), &record.xml)?;
            if record.deleted {
                tracing::debug!(
                    identifier,
                    datestamp = record.datestamp.as_deref().unwrap_or_default(),
                    entry = %entry,
                    "Archived deleted record"
                );
            }

            written += 1;
            self.result.num_received += 1;
        }

        self.close_current()
    }

    fn open_next(&mut self) -> Result<()> {
        self.sequence += 1;
        let name = archive_name(&self.prefix, self.sequence);
        let path = self.destination.join(&name);

        tracing::info!(archive = %name, "Opening archive");
        self.current = Some(ArchiveWriter::create(&path)?);
        self.result.filenames.push(name);
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut ArchiveWriter> {
        self.current
            .as_mut()
            .ok_or_else(|| HarvesterError::Io(io::Error::other("no archive open for writing")))
    }

    fn close_current(&mut self) -> Result<()> {
        if let Some(archive) = self.current.take() {
            let entries = archive.len();
            let path = archive.path().display().to_string();
            archive.finish()?;
            tracing::debug!(archive = %path, entries, "Closed archive");
        }
        Ok(())
    }

    /// Close the open archive, then delete every archive of this run.
    fn rollback(mut self, error: String) -> HarvestResult {
        if let Some(archive) = self.current.take() {
            if let Err(e) = archive.finish() {
                tracing::debug!(error = %e, "Ignoring close failure during rollback");
            }
        }

        for name in &self.result.filenames {
            let path = self.destination.join(name);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(archive = %path.display(), error = %e, "Failed to remove archive");
                }
            }
        }

        self.result.filenames.clear();
        self.result.outcome = HarvestOutcome::RolledBack { error };
        self.result
    }
}
