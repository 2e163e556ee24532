//! Staging of an import for human review.
//!
//! Nothing is written while staging. The existing references and ledger
//! plots are fetched once up front, the rows are then classified in order
//! against that snapshot plus everything already staged from the same file.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use plotline_ingest::RawRow;
use plotline_model::{InfraPaymentRecord, NewProject};
use serde::Serialize;

use crate::classify::{Classified, DedupState, DiscardReason, classify_row};
use crate::error::{ImportError, Result};
use crate::store::RecordStore;

/// Lifecycle of a [`StagedImportBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Scanning,
    AwaitingConfirmation,
    Committing,
    Done,
    /// Discarded by the operator before commit.
    Cancelled,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Scanning => "scanning",
            ImportPhase::AwaitingConfirmation => "awaiting confirmation",
            ImportPhase::Committing => "committing",
            ImportPhase::Done => "done",
            ImportPhase::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the scan found, shown to the operator before confirming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectedCounts {
    pub rows: usize,
    pub projects: usize,
    pub infra: usize,
    pub duplicate_references: usize,
    pub duplicate_plots: usize,
    pub unclassifiable: usize,
}

impl DetectedCounts {
    pub fn discarded(&self) -> usize {
        self.duplicate_references + self.duplicate_plots + self.unclassifiable
    }

    fn record(&mut self, classified: &Classified) {
        self.rows += 1;
        match classified {
            Classified::Project(_) => self.projects += 1,
            Classified::Infra(_) => self.infra += 1,
            Classified::Discard(DiscardReason::DuplicateReference) => {
                self.duplicate_references += 1;
            }
            Classified::Discard(DiscardReason::DuplicatePlot) => self.duplicate_plots += 1,
            Classified::Discard(DiscardReason::Unclassifiable) => self.unclassifiable += 1,
        }
    }
}

/// Rows classified and held in memory until the operator confirms.
#[derive(Debug, Clone)]
pub struct StagedImportBatch {
    projects: Vec<NewProject>,
    infra: Vec<InfraPaymentRecord>,
    counts: DetectedCounts,
    phase: ImportPhase,
    succeeded: usize,
    failed: usize,
}

impl StagedImportBatch {
    fn scanning() -> Self {
        Self {
            projects: Vec::new(),
            infra: Vec::new(),
            counts: DetectedCounts::default(),
            phase: ImportPhase::Scanning,
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn projects(&self) -> &[NewProject] {
        &self.projects
    }

    pub fn infra(&self) -> &[InfraPaymentRecord] {
        &self.infra
    }

    pub fn counts(&self) -> DetectedCounts {
        self.counts
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    /// Items written successfully so far.
    pub fn success_count(&self) -> usize {
        self.succeeded
    }

    /// Items that failed or were abandoned so far.
    pub fn error_count(&self) -> usize {
        self.failed
    }

    /// Returns true if there is nothing to write.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.infra.is_empty()
    }

    /// Discards the batch without writing anything.
    pub fn cancel(&mut self) -> Result<()> {
        self.expect_phase(ImportPhase::AwaitingConfirmation)?;
        self.phase = ImportPhase::Cancelled;
        Ok(())
    }

    pub(crate) fn begin_commit(&mut self) -> Result<()> {
        self.expect_phase(ImportPhase::AwaitingConfirmation)?;
        self.phase = ImportPhase::Committing;
        Ok(())
    }

    pub(crate) fn record_success(&mut self, count: usize) {
        self.succeeded += count;
    }

    pub(crate) fn record_failure(&mut self, count: usize) {
        self.failed += count;
    }

    pub(crate) fn finish(&mut self) {
        self.phase = ImportPhase::Done;
    }

    fn expect_phase(&self, expected: ImportPhase) -> Result<()> {
        if self.phase != expected {
            return Err(ImportError::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }
}

/// Classifies `rows` against the given existing keys.
///
/// The first occurrence of a reference or plot in `rows` wins; later
/// repeats are discarded as duplicates.
pub fn stage(
    rows: &[RawRow],
    existing_refs: &BTreeSet<String>,
    existing_plots: &BTreeSet<String>,
    now: DateTime<Utc>,
) -> StagedImportBatch {
    stage_with(
        rows,
        DedupState::new(existing_refs.clone(), existing_plots.clone()),
        now,
    )
}

/// Same as [`stage`], taking ownership of an already loaded snapshot.
pub fn stage_with(rows: &[RawRow], mut seen: DedupState, now: DateTime<Utc>) -> StagedImportBatch {
    let mut batch = StagedImportBatch::scanning();
    for row in rows {
        let classified = classify_row(row, &seen, now);
        tracing::debug!(line = row.line, routed = route_name(&classified), "classified row");
        seen.record(&classified);
        batch.counts.record(&classified);
        match classified {
            Classified::Project(project) => batch.projects.push(project),
            Classified::Infra(infra) => batch.infra.push(infra),
            Classified::Discard(_) => {}
        }
    }
    batch.phase = ImportPhase::AwaitingConfirmation;
    tracing::info!(
        rows = batch.counts.rows,
        projects = batch.counts.projects,
        infra = batch.counts.infra,
        discarded = batch.counts.discarded(),
        "import staged"
    );
    batch
}

/// Loads the existence snapshot from `store` and stages `rows` against it.
///
/// Fails with [`ImportError::Snapshot`] when either snapshot cannot be read.
pub async fn stage_from_store<S: RecordStore + ?Sized>(
    store: &S,
    rows: &[RawRow],
    now: DateTime<Utc>,
) -> Result<StagedImportBatch> {
    let seen = DedupState::load(store).await?;
    tracing::info!(
        references = seen.references.len(),
        infra_plots = seen.infra_plots.len(),
        "loaded existence snapshot"
    );
    Ok(stage_with(rows, seen, now))
}

fn route_name(classified: &Classified) -> &'static str {
    match classified {
        Classified::Project(_) => "project",
        Classified::Infra(_) => "infra",
        Classified::Discard(DiscardReason::DuplicateReference) => "duplicate_reference",
        Classified::Discard(DiscardReason::DuplicatePlot) => "duplicate_plot",
        Classified::Discard(DiscardReason::Unclassifiable) => "unclassifiable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn rows() -> Vec<RawRow> {
        vec![
            RawRow::from_pairs([("Status", "Design"), ("Reference", "R-1"), ("Plot", "10")]),
            RawRow::from_pairs([("Status", "GIS"), ("Reference", "R-1"), ("Plot", "11")]),
            RawRow::from_pairs([("Plot", "20")]),
            RawRow::from_pairs([("Plot", " 20")]),
            RawRow::from_pairs([("Zone", "East")]),
        ]
    }

    #[test]
    fn first_occurrence_wins_within_a_file() {
        let batch = stage(&rows(), &BTreeSet::new(), &BTreeSet::new(), Utc::now());
        assert_eq!(batch.phase(), ImportPhase::AwaitingConfirmation);
        assert_eq!(batch.projects().len(), 1);
        assert_eq!(batch.projects()[0].plot_number.as_deref(), Some("10"));
        assert_eq!(batch.infra().len(), 1);
        let counts = batch.counts();
        assert_eq!(counts.rows, 5);
        assert_eq!(counts.duplicate_references, 1);
        assert_eq!(counts.duplicate_plots, 1);
        assert_eq!(counts.unclassifiable, 1);
        assert_eq!(counts.discarded(), 3);
    }

    #[test]
    fn cancel_only_from_review() {
        let mut batch = stage(&[], &BTreeSet::new(), &BTreeSet::new(), Utc::now());
        assert!(batch.is_empty());
        batch.cancel().unwrap();
        assert_eq!(batch.phase(), ImportPhase::Cancelled);
        let err = batch.cancel().unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidPhase {
                expected: ImportPhase::AwaitingConfirmation,
                actual: ImportPhase::Cancelled
            }
        ));
    }

    #[tokio::test]
    async fn snapshot_failure_stops_staging() {
        let store = MemoryStore::new().with_failing_plot_snapshot();
        let err = stage_from_store(&store, &rows(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Snapshot { .. }));
    }
}
