use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while loading booking records or configuring a run.
///
/// The aggregation engine itself never fails; these only surface from the
/// ingestion layer and the command-line front end.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A JSON value was well-formed but is not a booking record object.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The requested input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the booking crates.
pub type Result<T> = std::result::Result<T, StatsError>;
