//! Error types for the animation engine
//!
//! Three classes of failure exist:
//! - malformed input records, rejected one at a time ([`RecordError`])
//! - fatal construction problems ([`EngineError`])
//! - surface failures during drawing or teardown ([`SurfaceError`])

use thiserror::Error;

/// Fatal engine errors. Returned from construction and configuration loading.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The drawing surface could not be acquired or has no usable size.
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The render loop was stopped; its resources are gone for good.
    #[error("render loop was stopped and cannot be restarted")]
    Stopped,
}

/// Why a single raw record was rejected at ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

/// Errors reported by a drawing surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// The surface backing storage was already released.
    #[error("surface already released")]
    Released,
}
