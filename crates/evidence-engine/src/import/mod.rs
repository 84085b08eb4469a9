//! Loading observation batches from JSON documents and flat CSV exports.

mod document;
mod parser;

use std::fmt;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::observations::ObservationBatch;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read observations: {}", err),
            ImportError::Csv(err) => write!(f, "invalid observation CSV data: {}", err),
            ImportError::Json(err) => write!(f, "invalid observation JSON document: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Input layout of an observation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// `.csv` files are CSV, anything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

pub struct ObservationImporter;

impl ObservationImporter {
    /// Read a file, choosing the format by extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ObservationBatch, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let batch = match ImportFormat::from_path(path) {
            ImportFormat::Csv => Self::from_csv_reader(file)?,
            ImportFormat::Json => Self::from_json_reader(file)?,
        };
        debug!(
            path = %path.display(),
            entries = batch.entries.len(),
            measurements = batch.measurements.len(),
            "imported observations"
        );
        Ok(batch)
    }

    /// `{ "entries": [...], "measurements": [...] }` or a bare array of entries.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<ObservationBatch, ImportError> {
        Ok(document::parse_document(reader)?)
    }

    pub fn from_json_str(raw: &str) -> Result<ObservationBatch, ImportError> {
        Self::from_json_reader(raw.as_bytes())
    }

    /// One observation entry per row; payload columns are `<kind>.<field>`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<ObservationBatch, ImportError> {
        Ok(ObservationBatch {
            entries: parser::parse_entries(reader)?,
            measurements: Vec::new(),
        })
    }

    /// Measurement rows: `id, timestamp, kind` plus the columns of that kind.
    pub fn measurements_from_csv_reader<R: Read>(
        reader: R,
    ) -> Result<ObservationBatch, ImportError> {
        Ok(ObservationBatch {
            entries: Vec::new(),
            measurements: parser::parse_measurements(reader)?,
        })
    }

    pub fn measurements_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<ObservationBatch, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        match ImportFormat::from_path(path) {
            ImportFormat::Csv => Self::measurements_from_csv_reader(file),
            ImportFormat::Json => Self::from_json_reader(file),
        }
    }
}
