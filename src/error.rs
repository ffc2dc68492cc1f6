//! Error taxonomy shared by the library and the CLI.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    /// Neither morphological analyzer backend answered the capability probe.
    #[error("no morphological analyzer available (tried: {})", tried.join(", "))]
    AnalyzerUnavailable { tried: Vec<String> },

    /// A document was blank after trimming.
    #[error("document is empty")]
    EmptyInput,

    /// Top-N pair selection left no edge to build a network from.
    #[error("insufficient co-occurrence data to build a network")]
    InsufficientCooccurrence,

    /// A single document failed; the batch continues.
    #[error("{name}: {reason}")]
    Document { name: String, reason: String },

    #[error("analyzer error: {0}")]
    Analyzer(String),

    #[error("exclusion dictionary error: {0}")]
    Dictionary(String),

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type MinerResult<T> = Result<T, MinerError>;
