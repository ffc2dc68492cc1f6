//! Export of analysis tables for renderers and spreadsheets.
//!
//! Every table is written as `<stem>_<YYYYMMDD_HHMMSS>_<table>.<ext>`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::ValueEnum;
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::MinerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn is_spreadsheet(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Tsv)
    }
}

/// Neutralize cells that a spreadsheet would evaluate as a formula.
///
/// A leading `=`, `+`, `-`, `@`, tab or carriage return gets a `'` prefix.
/// Cells already starting with `'` are left alone.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Apply [`csv_safe_cell`] when the target is a spreadsheet format.
pub fn export_cell(format: ExportFormat, cell: &str) -> String {
    if format.is_spreadsheet() {
        csv_safe_cell(cell.to_string())
    } else {
        cell.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WordFreqRow {
    pub item: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairRow {
    pub term1: String,
    pub term2: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub term: String,
    pub degree_centrality: f64,
    pub betweenness_centrality: f64,
    pub pagerank: f64,
    pub x: f64,
    pub y: f64,
    pub layout: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeRow {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRow {
    pub name: String,
    pub status: String,
    pub char_count: usize,
    pub word_count: usize,
    pub unique_word_count: usize,
    pub ttr: f64,
    pub avg_word_length: f64,
}

/// Output directory, file stem and the run's timestamp.
#[derive(Debug, Clone)]
pub struct ExportTarget {
    pub dir: PathBuf,
    pub stem: String,
    pub timestamp: String,
}

impl ExportTarget {
    pub fn new(dir: &Path, stem: &str) -> Self {
        let local: DateTime<Local> = Local::now();
        Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            timestamp: local.format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    pub fn path_for(&self, table: &str, extension: &str) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}.{}",
            self.stem, self.timestamp, table, extension
        ))
    }
}

/// Write one table in the requested format and return its path.
pub fn write_table<T: Serialize>(
    target: &ExportTarget,
    table: &str,
    rows: &[T],
    format: ExportFormat,
) -> MinerResult<PathBuf> {
    fs::create_dir_all(&target.dir)?;
    let path = target.path_for(table, format.extension());
    match format {
        ExportFormat::Json => {
            let file = File::create(&path)?;
            serde_json::to_writer_pretty(file, rows)?;
        }
        ExportFormat::Csv | ExportFormat::Tsv | ExportFormat::Txt => {
            let mut builder = WriterBuilder::new();
            match format {
                ExportFormat::Tsv => {
                    builder.delimiter(b'\t');
                }
                ExportFormat::Txt => {
                    builder.delimiter(b'\t').quote_style(QuoteStyle::Never);
                }
                _ => {}
            }
            let mut wtr = builder.from_path(&path)?;
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
    }
    Ok(path)
}

/// Write free text, e.g. the corpus report.
pub fn write_text(target: &ExportTarget, table: &str, text: &str) -> MinerResult<PathBuf> {
    fs::create_dir_all(&target.dir)?;
    let path = target.path_for(table, "txt");
    let mut file = File::create(&path)?;
    file.write_all(text.as_bytes())?;
    Ok(path)
}
