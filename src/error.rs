//! Pipeline error type: a kind for callers to branch on plus a human-readable message.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure categories surfaced by the inference path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No model bundle file at any configured location
    ArtifactMissing,
    /// Bundle present but malformed or internally inconsistent
    ArtifactInvalid,
    /// Requested classifier is not part of the bundle
    ModelUnavailable,
    /// Feature vector does not match what the scaler/classifier were fit with
    ShapeMismatch,
    /// Loan-to-income ratio with zero income under the strict policy
    DegenerateDivision,
    /// Probability outside [0, 1] or not finite
    InvalidProbability,
    /// Applicant field outside its accepted range or vocabulary
    InvalidInput,
    Io,
    Csv,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ArtifactMissing => "artifact missing",
            ErrorKind::ArtifactInvalid => "artifact invalid",
            ErrorKind::ModelUnavailable => "model unavailable",
            ErrorKind::ShapeMismatch => "feature shape mismatch",
            ErrorKind::DegenerateDivision => "degenerate division",
            ErrorKind::InvalidProbability => "invalid probability",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Io => "io error",
            ErrorKind::Csv => "csv error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn artifact_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArtifactInvalid, message)
    }

    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ShapeMismatch, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// Prefix the message with where it happened, keeping the kind.
    pub fn context(self, prefix: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{}: {}", prefix, self.message),
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        Self::artifact_invalid(e.to_string())
    }
}

impl From<csv::Error> for PipelineError {
    fn from(e: csv::Error) -> Self {
        Self::new(ErrorKind::Csv, e.to_string())
    }
}
