use thiserror::Error;
use uuid::Uuid;

use crate::models::DisasterType;

/// Errors raised by ingestion and the prediction engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Upload rejected before any parsing was attempted.
    #[error("invalid file: {reason}")]
    InvalidFile { reason: String },

    /// Input could not be turned into a dataset.
    #[error("failed to parse dataset: {0}")]
    Parse(String),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Too few historical records for the requested location.
    #[error("insufficient historical data for {location} (needed: {required}, found: {found})")]
    InsufficientData {
        location: String,
        found: usize,
        required: usize,
    },

    #[error("no rule table for disaster type {0}")]
    UnsupportedDisaster(DisasterType),

    #[error("document extraction failed: {0}")]
    DocumentExtraction(String),

    #[error("dataset not found: {0}")]
    DatasetNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, EngineError>;
