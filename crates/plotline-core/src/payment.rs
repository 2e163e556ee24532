//! Fee status of plots, derived from the infrastructure ledger.

use std::collections::BTreeSet;

use plotline_model::{InfraPaymentRecord, ProjectRecord};
use serde::Serialize;

use crate::error::Result;
use crate::plot::normalize_plot;
use crate::store::RecordStore;

/// Returns the subset of `plots` whose fees are cleared.
///
/// Plots are normalized and deduplicated, then queried in chunks of
/// `chunk_size`. A plot is paid when any ledger row for it has any
/// non-empty payment marker. A failed chunk is logged and skipped, so its
/// plots read as unpaid.
pub async fn resolve_paid<S, I, P>(store: &S, plots: I, chunk_size: usize) -> BTreeSet<String>
where
    S: RecordStore + ?Sized,
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    let wanted: BTreeSet<String> = plots
        .into_iter()
        .map(|plot| normalize_plot(plot.as_ref()))
        .filter(|plot| !plot.is_empty())
        .collect();
    let wanted: Vec<String> = wanted.into_iter().collect();

    let mut paid = BTreeSet::new();
    for (index, chunk) in wanted.chunks(chunk_size.max(1)).enumerate() {
        match store.payment_markers(chunk).await {
            Ok(markers) => {
                paid.extend(
                    markers
                        .into_iter()
                        .filter(|row| row.is_fee_paid())
                        .map(|row| normalize_plot(&row.plot_number)),
                );
            }
            Err(err) => {
                tracing::warn!(
                    chunk = index + 1,
                    plots = chunk.len(),
                    error = %err,
                    kind = %err.kind(),
                    "payment marker query failed, chunk skipped"
                );
            }
        }
    }
    // The store matches exactly, but guard against adapters that widen it.
    paid.retain(|plot| wanted.binary_search(plot).is_ok());
    tracing::debug!(requested = wanted.len(), paid = paid.len(), "resolved fee status");
    paid
}

/// A project together with its derived fee status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub fees_cleared: bool,
}

/// Annotates each project with whether its plot's fees are cleared.
///
/// Projects without a plot are never cleared.
pub async fn annotate_fee_status<S: RecordStore + ?Sized>(
    store: &S,
    projects: Vec<ProjectRecord>,
    chunk_size: usize,
) -> Vec<ProjectView> {
    let paid = resolve_paid(
        store,
        projects.iter().filter_map(|project| project.plot_number.as_deref()),
        chunk_size,
    )
    .await;
    projects
        .into_iter()
        .map(|project| {
            let fees_cleared = project
                .plot_number
                .as_deref()
                .is_some_and(|plot| paid.contains(&normalize_plot(plot)));
            ProjectView {
                project,
                fees_cleared,
            }
        })
        .collect()
}

/// Finds ledger rows whose plot contains `fragment`, ignoring case.
///
/// An empty fragment matches nothing rather than the whole ledger.
pub async fn search_ledger<S: RecordStore + ?Sized>(
    store: &S,
    fragment: &str,
) -> Result<Vec<InfraPaymentRecord>> {
    let fragment = normalize_plot(fragment);
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let rows = store.search_ledger(&fragment).await.inspect_err(|err| {
        tracing::error!(error = %err, kind = %err.kind(), "ledger search failed");
    })?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{DateTime, Utc};
    use plotline_model::{NewProject, Stage};

    fn ledger(plot: &str, first: &str) -> InfraPaymentRecord {
        InfraPaymentRecord {
            plot_number: plot.to_string(),
            owner_name: String::new(),
            application_number: String::new(),
            first_payment: first.to_string(),
            second_payment: String::new(),
            third_payment: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn paid_needs_a_marker() {
        let store = MemoryStore::new().with_infra([
            ledger("55B", "2024-01-01"),
            ledger("56", "   "),
            ledger("57", ""),
            ledger("57", "paid"),
        ]);
        let paid = resolve_paid(&store, [" 55B ", "56", "57", "58", ""], 200).await;
        assert_eq!(paid, BTreeSet::from(["55B".to_string(), "57".to_string()]));
    }

    #[tokio::test]
    async fn failed_chunk_under_counts() {
        let store = MemoryStore::new()
            .with_infra([ledger("1", "x"), ledger("2", "x"), ledger("3", "x")])
            .with_failing_marker_query(2);
        let paid = resolve_paid(&store, ["1", "2", "3"], 1).await;
        assert_eq!(paid, BTreeSet::from(["1".to_string(), "3".to_string()]));
        assert_eq!(store.marker_query_calls(), 3);
    }

    #[tokio::test]
    async fn annotation_follows_plot() {
        let project = |reference: &str, plot: Option<&str>| NewProject {
            label: String::new(),
            stage: Stage::Gis,
            plot_number: plot.map(str::to_string),
            reference_number: reference.to_string(),
            zone: String::new(),
            block: String::new(),
            wayleave_number: String::new(),
            account_number: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            justification: None,
            escalation_date: None,
        };
        let store = MemoryStore::new()
            .with_projects([project("A", Some("55B")), project("B", Some("9")), project("C", None)])
            .with_infra([ledger("55B", "2024-01-01")]);
        let projects = store.list_projects().await.unwrap();
        let views = annotate_fee_status(&store, projects, 200).await;
        let cleared: Vec<_> = views
            .iter()
            .map(|view| (view.project.reference_number.as_str(), view.fees_cleared))
            .collect();
        assert!(cleared.contains(&("A", true)));
        assert!(cleared.contains(&("B", false)));
        assert!(cleared.contains(&("C", false)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_blank_matches_nothing() {
        let store = MemoryStore::new().with_infra([ledger("55B", ""), ledger("155b", "")]);
        assert_eq!(search_ledger(&store, " 55b").await.unwrap().len(), 2);
        assert!(search_ledger(&store, "   ").await.unwrap().is_empty());
    }
}
