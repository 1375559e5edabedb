//! Flat four-column output
//!
//! Rows are written as `Title,Status,URL,Definition`. The header is always
//! written, even for an empty run.

use crate::dictionary::{TermRecord, TermStatus};
use crate::errors::NomenError;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const COLUMNS: [&str; 4] = ["Title", "Status", "URL", "Definition"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub title: String,
    pub status: TermStatus,
    pub url: String,
    pub definition: String,
}

impl OutputRow {
    pub fn from_record(record: &TermRecord, definition: String) -> Self {
        Self {
            title: record.title.clone(),
            status: record.status.clone(),
            url: record.url.clone(),
            definition,
        }
    }
}

pub trait TabularExporter {
    fn export(&self, rows: &[OutputRow]) -> Result<(), NomenError>;
}

pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_to<W: Write>(writer: W, rows: &[OutputRow]) -> Result<(), NomenError> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(COLUMNS)?;
        for row in rows {
            wtr.write_record([
                row.title.as_str(),
                row.status.as_str(),
                row.url.as_str(),
                row.definition.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl TabularExporter for CsvExporter {
    fn export(&self, rows: &[OutputRow]) -> Result<(), NomenError> {
        let file = std::fs::File::create(&self.path).map_err(|e| {
            NomenError::ExportError(format!(
                "Failed to create output file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Self::write_to(file, rows)?;
        log::info!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}
