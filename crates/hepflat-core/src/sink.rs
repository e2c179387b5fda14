//! Row emission to columnar storage.
//!
//! [`RowSink`] is the seam between the flattening engine and the storage
//! collaborator: one call per completed event, then a final flush. A
//! write failure is fatal for the whole run — a partially written output
//! file is corrupt by convention, so errors propagate and are never
//! retried.
//!
//! [`JsonlSink`] is the production implementation: one JSON object per
//! line, column names as in [`EventRow`]. [`MemorySink`] collects rows
//! in memory and backs the tests.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::flatten::EventRow;

/// Errors raised while emitting rows.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write row: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize row: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for flattened event rows.
pub trait RowSink {
    /// Commit one completed event row.
    ///
    /// After this returns the caller may reset and reuse the row buffers.
    ///
    /// # Errors
    ///
    /// Any error is fatal for the run and must abort further processing.
    fn write_row(&mut self, row: &EventRow) -> Result<(), SinkError>;

    /// Flush buffered rows to durable storage.
    ///
    /// # Errors
    ///
    /// Same contract as [`write_row`](RowSink::write_row).
    fn finish(&mut self) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// JSONL sink
// ---------------------------------------------------------------------------

/// Writes one JSON line per event row.
#[derive(Debug)]
pub struct JsonlSink {
    out: BufWriter<File>,
    path: PathBuf,
    rows_written: u64,
}

impl JsonlSink {
    /// Create (truncating) the output file.
    ///
    /// # Errors
    ///
    /// Propagates file-creation failures.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        debug!(path = %path.display(), "opened JSONL sink");
        Ok(Self {
            out: BufWriter::new(file),
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RowSink for JsonlSink {
    fn write_row(&mut self, row: &EventRow) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.out, row)?;
        self.out.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        debug!(
            path = %self.path.display(),
            rows = self.rows_written,
            "closed JSONL sink"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

/// Collects rows in memory. Test double for [`JsonlSink`].
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<EventRow>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for MemorySink {
    fn write_row(&mut self, row: &EventRow) -> Result<(), SinkError> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
