//! Writing a confirmed batch to the record store.
//!
//! Projects go one at a time so one bad row cannot sink the rest. Ledger
//! rows go in chunks; the first failed chunk ends the bulk path, so a
//! partial ledger import is always a prefix of the staged rows.

use std::future::Future;

use plotline_model::{ErrorKind, InfraPaymentRecord};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::ImportSettings;
use crate::error::Result;
use crate::staging::StagedImportBatch;
use crate::store::{RecordStore, StoreResult};

/// How a commit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CommitOutcome {
    /// Every staged item was attempted.
    Completed,
    /// Ledger chunk `chunk` (1-based) failed; later chunks were not sent.
    ChunkFailed { chunk: usize, kind: ErrorKind },
    /// The operator cancelled mid-commit.
    Cancelled,
    /// The overall import timeout elapsed.
    TimedOut,
}

/// Per-kind tallies of a commit.
///
/// Items in a failed chunk, and in every chunk after it, are counted in
/// `infra_failed`. Items skipped because of cancellation or timeout are
/// counted in `not_attempted` and also as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub projects_succeeded: usize,
    pub projects_failed: usize,
    pub infra_succeeded: usize,
    pub infra_failed: usize,
    pub not_attempted: usize,
    pub outcome: CommitOutcome,
}

impl CommitResult {
    fn new() -> Self {
        Self {
            projects_succeeded: 0,
            projects_failed: 0,
            infra_succeeded: 0,
            infra_failed: 0,
            not_attempted: 0,
            outcome: CommitOutcome::Completed,
        }
    }

    pub fn success_count(&self) -> usize {
        self.projects_succeeded + self.infra_succeeded
    }

    pub fn error_count(&self) -> usize {
        self.projects_failed + self.infra_failed + self.not_attempted
    }
}

/// Why the commit stopped before a store call.
#[derive(Debug, Clone, Copy)]
enum Halt {
    Cancelled,
    TimedOut,
}

impl From<Halt> for CommitOutcome {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Cancelled => CommitOutcome::Cancelled,
            Halt::TimedOut => CommitOutcome::TimedOut,
        }
    }
}

/// Commits staged batches against one store.
pub struct BatchCommitter<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    settings: ImportSettings,
}

impl<'a, S: RecordStore + ?Sized> BatchCommitter<'a, S> {
    pub fn new(store: &'a S, settings: ImportSettings) -> Self {
        Self { store, settings }
    }

    /// Writes `batch`. The batch must be awaiting confirmation.
    ///
    /// Store failures never surface as `Err`; they are counted. The only
    /// error is calling this on a batch in the wrong phase. The committer
    /// keeps no cache, callers re-fetch whatever they display.
    pub async fn commit(
        &self,
        batch: &mut StagedImportBatch,
        cancel: &CancellationToken,
    ) -> Result<CommitResult> {
        batch.begin_commit()?;
        let deadline = Instant::now() + self.settings.import_timeout();
        let mut result = CommitResult::new();

        let projects = batch.projects().to_vec();
        let infra = batch.infra().to_vec();
        tracing::info!(
            projects = projects.len(),
            infra = infra.len(),
            chunk_size = self.settings.infra_chunk_size,
            "committing import"
        );

        let mut stopped = None;
        for (index, project) in projects.iter().enumerate() {
            match self
                .step(cancel, deadline, self.store.insert_project(project))
                .await
            {
                Ok(Ok(record)) => {
                    tracing::debug!(id = %record.id, "project inserted");
                    result.projects_succeeded += 1;
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        reference = %project.reference_number,
                        error = %err,
                        kind = %err.kind(),
                        "project insert failed"
                    );
                    result.projects_failed += 1;
                }
                Err(halt) => {
                    result.not_attempted += projects.len() - index;
                    stopped = Some(CommitOutcome::from(halt));
                    break;
                }
            }
        }

        match stopped {
            Some(outcome) => {
                result.not_attempted += infra.len();
                result.outcome = outcome;
            }
            None => self.commit_infra(&infra, cancel, deadline, &mut result).await,
        }

        batch.record_success(result.success_count());
        batch.record_failure(result.error_count());
        batch.finish();
        tracing::info!(
            succeeded = result.success_count(),
            failed = result.error_count(),
            not_attempted = result.not_attempted,
            outcome = ?result.outcome,
            "import committed"
        );
        Ok(result)
    }

    async fn commit_infra(
        &self,
        infra: &[InfraPaymentRecord],
        cancel: &CancellationToken,
        deadline: Instant,
        result: &mut CommitResult,
    ) {
        let chunk_size = self.settings.infra_chunk_size.max(1);
        let mut sent = 0;
        for (index, chunk) in infra.chunks(chunk_size).enumerate() {
            let number = index + 1;
            match self
                .step(cancel, deadline, self.store.insert_infra_payments(chunk))
                .await
            {
                Ok(Ok(())) => {
                    tracing::debug!(chunk = number, rows = chunk.len(), "ledger chunk inserted");
                    result.infra_succeeded += chunk.len();
                    sent += chunk.len();
                }
                Ok(Err(err)) => {
                    let remaining = infra.len() - sent;
                    tracing::warn!(
                        chunk = number,
                        error = %err,
                        kind = %err.kind(),
                        abandoned = remaining,
                        "ledger chunk failed, stopping bulk insert"
                    );
                    result.infra_failed += remaining;
                    result.outcome = CommitOutcome::ChunkFailed {
                        chunk: number,
                        kind: err.kind(),
                    };
                    return;
                }
                Err(halt) => {
                    result.not_attempted += infra.len() - sent;
                    result.outcome = halt.into();
                    return;
                }
            }
        }
    }

    /// Runs one store call unless the commit was cancelled or ran out of time.
    ///
    /// A call cut off by the deadline reports `TimedOut`, so its items land
    /// in `not_attempted` even though the store may have received them.
    async fn step<T>(
        &self,
        cancel: &CancellationToken,
        deadline: Instant,
        call: impl Future<Output = StoreResult<T>>,
    ) -> std::result::Result<StoreResult<T>, Halt> {
        if cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        if Instant::now() >= deadline {
            return Err(Halt::TimedOut);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Halt::Cancelled),
            outcome = tokio::time::timeout_at(deadline, call) => {
                outcome.map_err(|_| Halt::TimedOut)
            }
        }
    }
}
