//! Error types for import and reconciliation.

use plotline_ingest::IngestError;
use plotline_model::{ErrorKind, ModelError, ProjectId};
use thiserror::Error;

use crate::staging::ImportPhase;
use crate::store::StoreError;

/// Errors surfaced by the engine. Every variant maps onto an [`ErrorKind`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// The pre-import existence snapshot could not be loaded.
    ///
    /// Staging stops here: unknown plots are never assumed to be new.
    #[error("could not load existing {what} before import: {source}")]
    Snapshot {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{0}")]
    Validation(String),

    #[error("reference number {0} is already in use")]
    DuplicateReference(String),

    #[error("project {0} not found")]
    NotFound(ProjectId),

    #[error("import batch is {actual}, expected {expected}")]
    InvalidPhase {
        expected: ImportPhase,
        actual: ImportPhase,
    },

    #[error("invalid import settings: {0}")]
    Config(String),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Snapshot { source, .. } | ImportError::Store(source) => source.kind(),
            ImportError::Ingest(_)
            | ImportError::Model(_)
            | ImportError::Validation(_)
            | ImportError::InvalidPhase { .. }
            | ImportError::Config(_) => ErrorKind::Validation,
            ImportError::DuplicateReference(_) => ErrorKind::Conflict,
            ImportError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_failure_keeps_transport_kind() {
        let err = ImportError::Snapshot {
            what: "reference numbers",
            source: StoreError::Transport("connection reset".to_string()),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.to_string(),
            "could not load existing reference numbers before import: store unreachable: connection reset"
        );
    }

    #[test]
    fn validation_kinds() {
        let err: ImportError = ModelError::EmptyProjectId.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            ImportError::DuplicateReference("REF-1".into()).kind(),
            ErrorKind::Conflict
        );
    }
}
