//! In-memory zip (CBZ) assembly.
//!
//! Entries are buffered and written in insertion order when the archive is
//! finished. Timestamps and permissions are fixed so the same entries always
//! produce the same bytes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// How entry contents are stored in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Stored,
    #[default]
    Deflated,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("zip write: {0}")]
    Io(#[from] std::io::Error),
}

/// One file in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Collects entries and renders them into zip bytes.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    compression: Compression,
    entries: Vec<ArchiveEntry>,
    positions: HashMap<String, usize>,
}

impl ArchiveBuilder {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Add an entry. A second entry with the same filename replaces the
    /// content of the first and keeps its position.
    pub fn add(&mut self, entry: ArchiveEntry) {
        match self.positions.get(&entry.filename) {
            Some(&pos) => {
                tracing::debug!(filename = %entry.filename, "duplicate archive entry overwritten");
                self.entries[pos] = entry;
            }
            None => {
                self.positions
                    .insert(entry.filename.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filenames in archive order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.filename.as_str())
    }

    /// Write all entries and return the finished archive.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        let options = FileOptions::default()
            .compression_method(self.compression.method())
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            writer.start_file(entry.filename.as_str(), options)?;
            writer.write_all(&entry.content)?;
        }
        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
