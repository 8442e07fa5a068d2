use std::io;

use thiserror::Error;

use crate::category::Field;
use crate::segment::SegmentId;

/// Error type for loading reference data, running the model and resolving segments.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("model inference failed: {0}")]
    ModelInference(String),
    #[error("segment '{0}' has no entry in the segment catalog")]
    MissingCatalogEntry(SegmentId),
    #[error("'{value}' is not a valid option for {field}")]
    UnknownCategory { field: Field, value: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to encode MessagePack: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode MessagePack: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

pub type Result<T> = std::result::Result<T, SegmentError>;
