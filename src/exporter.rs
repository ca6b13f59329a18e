use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use log::warn;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::record::{Block, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Text,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Text];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Text => "TXT",
        }
    }

    /// `quotes` -> `quotes.csv`, `quotes.json`, ...
    pub fn file_name(self, stem: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", stem, self.extension()))
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to save!")]
    NoRecords,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes `records` to `path`. With no records nothing is created.
pub fn export(records: &[Record], format: ExportFormat, path: &Path) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    let mut out = BufWriter::new(File::create(path)?);
    let written = write(records, format, &mut out)?;
    out.flush()?;
    Ok(written)
}

pub fn write<W: Write>(records: &[Record], format: ExportFormat, out: W) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(records, out),
        ExportFormat::Json => write_json(records, out),
        ExportFormat::Text => write_text(records, out),
    }
}

/// Header is the first record's keys. Later rows are laid out under that
/// header by key: absent keys become empty cells, extra keys are dropped.
pub fn write_csv<W: Write>(records: &[Record], out: W) -> Result<usize, ExportError> {
    let Some(first) = records.first() else {
        return Err(ExportError::NoRecords);
    };
    let header = first.keys();

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&header)?;

    let mut mismatched = 0;
    for record in records {
        if record.keys() != header {
            mismatched += 1;
        }
        let row: Vec<String> = header
            .iter()
            .map(|key| record.get(key).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    if mismatched > 0 {
        warn!(
            "{} record(s) have fields that differ from the CSV header {:?}",
            mismatched, header
        );
    }
    Ok(records.len())
}

/// One array document, 4-space indented, non-ASCII kept as is.
pub fn write_json<W: Write>(records: &[Record], out: W) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    let mut ser = serde_json::Serializer::with_formatter(out, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    Ok(records.len())
}

pub fn write_text<W: Write>(records: &[Record], mut out: W) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    for (i, record) in records.iter().enumerate() {
        writeln!(out, "{}", Block { index: i + 1, record })?;
    }
    Ok(records.len())
}
