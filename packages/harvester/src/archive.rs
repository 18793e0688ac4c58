//! Zip archives holding one XML entry per harvested record.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ARCHIVE_EXTENSION;
use crate::error::Result;

/// Name of the archive with the given 1-based sequence number.
///
/// # Examples
/// ```
/// use oai_harvester::archive::archive_name;
///
/// assert_eq!(archive_name("2024-01-01_12-00-00", 1), "2024-01-01_12-00-00-001.zip");
/// assert_eq!(archive_name("dump", 42), "dump-042.zip");
/// ```
pub fn archive_name(prefix: &str, sequence: u32) -> String {
    format!("{prefix}-{sequence:03}.{ARCHIVE_EXTENSION}")
}

/// An open archive accepting new entries.
pub struct ArchiveWriter {
    path: PathBuf,
    zip: ZipWriter<BufWriter<File>>,
    options: SimpleFileOptions,
    names: HashSet<String>,
}

impl ArchiveWriter {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        Ok(Self {
            path: path.to_path_buf(),
            zip: ZipWriter::new(BufWriter::new(file)),
            options,
            names: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Add `<stem>.xml` holding `bytes` and return the entry name used.
    ///
    /// Entry names are unique within an archive: a stem that was already
    /// written gets a `_2`, `_3`, ... suffix.
    pub fn write_entry(&mut self, stem: &str, bytes: &[u8]) -> Result<String> {
        let name = self.unique_name(stem);

        self.zip.start_file(name.as_str(), self.options)?;
        self.zip.write_all(bytes)?;
        self.names.insert(name.clone());

        Ok(name)
    }

    /// Write the central directory and flush the file.
    pub fn finish(self) -> Result<()> {
        let mut file = self.zip.finish()?;
        file.flush()?;
        Ok(())
    }

    fn unique_name(&self, stem: &str) -> String {
        let name = format!("{stem}.xml");
        if !self.names.contains(&name) {
            return name;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}.xml");
            if !self.names.contains(&candidate) {
                tracing::warn!(
                    archive = %self.path.display(),
                    entry = %name,
                    renamed = %candidate,
                    "Duplicate entry name in archive"
                );
                return candidate;
            }
            n += 1;
        }
    }
}
