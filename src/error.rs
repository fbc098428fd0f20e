use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Input file {path} is missing or unreadable: {source}")]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row at {path}:{line}: expected at least {expected} fields, found {found}")]
    MalformedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Column '{column}' not found in {artifact}")]
    SchemaMismatch { artifact: String, column: String },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Source lengths differ (csv={csv}, tsv={tsv}, fixed-width={fixed_width}) under strict alignment"
    )]
    LengthMismatch {
        csv: usize,
        tsv: usize,
        fixed_width: usize,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Map an `open` failure on a stage input to `MissingInput`.
    pub fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProcessingError::MissingInput {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProcessingError::Write {
            path: path.into(),
            source,
        }
    }
}
