use crate::types::Dataset;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Required column(s) absent. Fatal: raised before any analysis runs.
    #[error("{dataset} table is missing required column(s): {}", missing.join(", "))]
    Schema {
        dataset: Dataset,
        missing: Vec<String>,
    },

    /// License ids must be unique; a collision is a load-time failure.
    #[error("duplicate license id '{id}'")]
    DuplicateId { id: String },

    /// A threshold outside its valid range. Fatal, caught before analyses start.
    #[error("invalid value for {option}: {value} ({reason})")]
    Config {
        option: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
