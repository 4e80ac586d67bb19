use std::path::PathBuf;

/// Why a single input row could not become a KPI record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("{field} must be a number, got {value:?}")]
    NotNumeric { field: &'static str, value: String },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("invalid direction {0:?}: expected HigherIsBetter or LowerIsBetter")]
    InvalidDirection(String),
    #[error("benchmark must be greater than zero, got {0}")]
    NonPositiveBenchmark(f64),
}

/// File-level failures while reading a KPI table.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported file type {0:?}: expected xlsx, xlsm, xls, xlsb, ods or csv")]
    UnsupportedFormat(String),
    #[error("the first worksheet has no header row")]
    EmptySheet,
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("no valid KPI records to render; add or fix rows first")]
    Empty,
    #[error("failed to assemble presentation package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
