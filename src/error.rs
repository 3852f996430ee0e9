use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by loading, indexing and binning histogram data.
#[derive(Debug, Error)]
pub enum KqrError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON histogram: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV histogram: {0}")]
    Csv(#[from] csv::Error),

    #[error("series `{0}` has no datapoints")]
    EmptySeries(String),

    #[error("line {line}: field `{field}` is not numeric (got `{value}`)")]
    InvalidField {
        line: usize,
        field: String,
        value: String,
    },

    #[error("input contains no series")]
    NoSeries,

    #[error("no series named `{0}`")]
    UnknownSeries(String),
}

pub type Result<T> = std::result::Result<T, KqrError>;
