//! The external record store seam.
//!
//! The engine never joins server-side: every cross-reference is computed
//! here after separate fetches. Adapters translate their own column
//! conventions into the canonical records before returning.

mod memory;

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use plotline_model::{
    ErrorKind, InfraPaymentRecord, NewProject, PaymentMarkers, ProjectId, ProjectPatch,
    ProjectRecord,
};
use thiserror::Error;

pub use memory::MemoryStore;

/// Errors reported by a [`RecordStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Network failure or server-side fault.
    #[error("store unreachable: {0}")]
    Transport(String),

    /// No response within the allotted time.
    #[error("store request timed out after {0:?}")]
    Timeout(Duration),

    /// Write collides with existing data.
    #[error("store conflict: {0}")]
    Conflict(String),

    /// Request rejected as invalid.
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// Addressed record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Response could not be decoded into canonical records.
    #[error("malformed store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Transport(_) | StoreError::Timeout(_) | StoreError::Decode(_) => {
                ErrorKind::Transport
            }
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Rejected(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Operations the reconciliation engine needs from the record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every project, newest first.
    async fn list_projects(&self) -> StoreResult<Vec<ProjectRecord>>;

    async fn get_project(&self, id: &ProjectId) -> StoreResult<Option<ProjectRecord>>;

    /// Inserts one project and returns it with its assigned id.
    async fn insert_project(&self, project: &NewProject) -> StoreResult<ProjectRecord>;

    /// Applies a partial update and returns the updated record.
    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<ProjectRecord>;

    async fn delete_project(&self, id: &ProjectId) -> StoreResult<()>;

    /// Every reference number currently held, for import dedup.
    async fn reference_numbers(&self) -> StoreResult<BTreeSet<String>>;

    /// Every plot number in the fee ledger, for import dedup.
    async fn infra_plot_numbers(&self) -> StoreResult<BTreeSet<String>>;

    /// Inserts one chunk of ledger rows. All or nothing per call.
    async fn insert_infra_payments(&self, rows: &[InfraPaymentRecord]) -> StoreResult<()>;

    /// Payment markers of ledger rows whose plot is exactly one of `plots`.
    async fn payment_markers(&self, plots: &[String]) -> StoreResult<Vec<PaymentMarkers>>;

    /// Ledger rows whose plot contains `fragment`, ignoring case.
    async fn search_ledger(&self, fragment: &str) -> StoreResult<Vec<InfraPaymentRecord>>;

    /// Removes every ledger row and returns how many were removed.
    async fn clear_infra_payments(&self) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(
            StoreError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Transport
        );
        assert_eq!(StoreError::Conflict("dup".into()).kind(), ErrorKind::Conflict);
        assert_eq!(StoreError::Rejected("bad".into()).kind(), ErrorKind::Validation);
        assert_eq!(StoreError::NotFound("p-1".into()).kind(), ErrorKind::NotFound);
    }
}
