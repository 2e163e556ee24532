//! Error classification shared by every layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse error category surfaced to callers instead of raw transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before or by the store (bad field, missing date).
    Validation,
    /// Network failure, timeout, or server-side fault.
    Transport,
    /// Write rejected because it collides with existing data.
    Conflict,
    /// The addressed record does not exist.
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing model values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("project id must not be empty")]
    EmptyProjectId,

    #[error("stage {stage} requires an escalation date")]
    MissingEscalationDate { stage: crate::Stage },
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
