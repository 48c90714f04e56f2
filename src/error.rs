// src/error.rs
//! Error taxonomy for the ingestion run.
//!
//! Only [`ConfigError`] ends the process. [`SourceError`] skips one source,
//! everything wrapped in [`RecordError`] skips one record.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),
    #[error("invalid configuration value {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("cannot read config file {path}: {reason}")]
    File { path: String, reason: String },
}

/// The whole source cannot be enumerated (file missing, feed unreachable, empty feed).
#[derive(Debug, Error)]
#[error("source {source_name} unavailable: {reason}")]
pub struct SourceError {
    pub source_name: &'static str,
    pub reason: String,
}

impl SourceError {
    pub fn new(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            source_name,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
    /// Failure injected by mock clients; the Gemini client never builds it.
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response JSON is not an object")]
    NotAnObject,
    #[error("required field {0} is missing")]
    MissingField(&'static str),
    #[error("field {field} has an unusable value: {value}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("record has no {0}")]
    MissingInput(&'static str),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Sub-stage of the per-record loop where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStage {
    Extracting,
    Classifying,
    Mapping,
    Persisting,
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordStage::Extracting => "extracting",
            RecordStage::Classifying => "classifying",
            RecordStage::Mapping => "mapping",
            RecordStage::Persisting => "persisting",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum RecordFailure {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
#[error("{stage} failed: {failure}")]
pub struct RecordError {
    pub stage: RecordStage,
    pub failure: RecordFailure,
}

impl RecordError {
    pub fn at(stage: RecordStage, failure: impl Into<RecordFailure>) -> Self {
        Self {
            stage,
            failure: failure.into(),
        }
    }
}
