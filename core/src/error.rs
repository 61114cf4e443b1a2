use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunGraphError>;

#[derive(Error, Debug)]
pub enum RunGraphError {
    /// En post i eksporten (eller en rad i cachen) mangler et påkrevd felt.
    #[error("malformed {kind} record: missing field `{field}`")]
    MalformedRecord { kind: &'static str, field: String },

    #[error("could not parse {field} from {input:?}: {reason}")]
    Parse {
        field: String,
        input: String,
        reason: String,
    },

    #[error("invalid aggregation mode {0:?} (expected max, median, mean or all)")]
    InvalidArgument(String),

    #[error("unknown table schema {0:?} (expected \"runs\" or \"heart_rates\")")]
    InvalidSchema(String),

    #[error("cache marker {} is corrupt: {content:?}", path.display())]
    CacheCorruption { path: PathBuf, content: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl RunGraphError {
    pub(crate) fn parse(field: &str, input: &str, reason: impl ToString) -> Self {
        RunGraphError::Parse {
            field: field.to_string(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing(kind: &'static str, field: &str) -> Self {
        RunGraphError::MalformedRecord {
            kind,
            field: field.to_string(),
        }
    }
}
