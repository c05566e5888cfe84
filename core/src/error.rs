use thiserror::Error;

/// Malformed, missing or out-of-domain input. Fatal for the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataFormatError {
    #[error("{source_name}: required column '{column}' is missing")]
    MissingColumn { source_name: String, column: String },

    #[error(
        "{source_name} row {row} (respondent '{respondent_id}'): \
         invalid {field} '{value}': {reason}"
    )]
    InvalidValue {
        source_name: String,
        row: usize,
        respondent_id: String,
        field: String,
        value: String,
        reason: String,
    },

    #[error("{source_name}: respondent '{respondent_id}' appears more than once (row {row})")]
    DuplicateRespondent {
        source_name: String,
        row: usize,
        respondent_id: String,
    },

    #[error("Cannot read {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// The caller asked to group by a dimension that does not exist.
/// Fatal for that aggregation call only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported grouping dimension '{requested}' (expected one of: {expected})")]
pub struct InvalidGroupingError {
    pub requested: String,
    pub expected: String,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data format error: {0}")]
    DataFormat(#[from] DataFormatError),

    #[error(transparent)]
    InvalidGrouping(#[from] InvalidGroupingError),

    #[error("Table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
