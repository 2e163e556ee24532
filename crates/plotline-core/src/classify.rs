//! Routing of spreadsheet rows to projects, ledger rows, or discard.
//!
//! A single export may mix newly started projects with historical ledger
//! rows and there is no discriminator column. The signal is the workflow
//! status: a recognized status on a row whose reference is not yet taken is
//! a project; a row carrying only a plot is a ledger row.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use plotline_ingest::{RawRow, RowLookup};
use plotline_model::{InfraPaymentRecord, NewProject};

use crate::error::{ImportError, Result};
use crate::fields;
use crate::plot::normalize_plot;
use crate::status::{classify_status, is_recognized_import_status, normalize_status};
use crate::store::RecordStore;

/// Keys already taken, used to drop duplicates during an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupState {
    /// Reference numbers of existing projects.
    pub references: BTreeSet<String>,
    /// Normalized plot numbers already in the fee ledger.
    pub infra_plots: BTreeSet<String>,
}

impl DedupState {
    pub fn new(references: BTreeSet<String>, infra_plots: BTreeSet<String>) -> Self {
        Self {
            references,
            infra_plots,
        }
    }

    /// Fetches both snapshots from the store, once each.
    ///
    /// Either fetch failing fails the whole load; an import must never
    /// proceed as if the ledger were empty.
    pub async fn load<S: RecordStore + ?Sized>(store: &S) -> Result<Self> {
        let references = store.reference_numbers().await.map_err(|source| {
            tracing::error!(error = %source, kind = %source.kind(), "reference snapshot failed");
            ImportError::Snapshot {
                what: "reference numbers",
                source,
            }
        })?;
        let infra_plots = store.infra_plot_numbers().await.map_err(|source| {
            tracing::error!(error = %source, kind = %source.kind(), "ledger plot snapshot failed");
            ImportError::Snapshot {
                what: "ledger plot numbers",
                source,
            }
        })?;
        Ok(Self::new(
            references,
            infra_plots.iter().map(|plot| normalize_plot(plot)).collect(),
        ))
    }

    /// Records a staged classification so later rows see it as taken.
    pub fn record(&mut self, classified: &Classified) {
        match classified {
            Classified::Project(project) if !project.reference_number.is_empty() => {
                self.references.insert(project.reference_number.clone());
            }
            Classified::Project(_) => {}
            Classified::Infra(row) => {
                self.infra_plots.insert(row.plot_number.clone());
            }
            Classified::Discard(_) => {}
        }
    }
}

/// Why a row was not staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// The reference number already belongs to a project.
    DuplicateReference,
    /// The plot is already in the fee ledger.
    DuplicatePlot,
    /// Neither a recognized status nor a plot.
    Unclassifiable,
}

/// Outcome of routing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Project(NewProject),
    Infra(InfraPaymentRecord),
    Discard(DiscardReason),
}

/// Routes one row. Pure: reads only its arguments.
///
/// `now` stamps records whose creation date is missing or unparseable.
pub fn classify_row(row: &RawRow, dedup: &DedupState, now: DateTime<Utc>) -> Classified {
    let lookup = RowLookup::new(row);
    let reference = lookup.resolve(fields::REFERENCE);
    let status = normalize_status(&lookup.resolve(fields::STATUS));

    if !reference.is_empty() && dedup.references.contains(&reference) {
        return Classified::Discard(DiscardReason::DuplicateReference);
    }

    if is_recognized_import_status(&status) {
        return Classified::Project(build_project(&lookup, reference, &status, now));
    }

    let plot = normalize_plot(&lookup.resolve(fields::PLOT));
    if plot.is_empty() {
        return Classified::Discard(DiscardReason::Unclassifiable);
    }
    if dedup.infra_plots.contains(&plot) {
        return Classified::Discard(DiscardReason::DuplicatePlot);
    }
    Classified::Infra(build_infra(&lookup, plot, now))
}

fn build_project(
    lookup: &RowLookup<'_>,
    reference: String,
    status: &str,
    now: DateTime<Utc>,
) -> NewProject {
    let plot = normalize_plot(&lookup.resolve(fields::PLOT));
    NewProject {
        label: lookup.resolve(fields::LABEL),
        stage: classify_status(status),
        plot_number: (!plot.is_empty()).then_some(plot),
        reference_number: reference,
        zone: lookup.resolve(fields::ZONE),
        block: lookup.resolve(fields::BLOCK),
        wayleave_number: lookup.resolve(fields::WAYLEAVE),
        account_number: lookup.resolve(fields::ACCOUNT),
        created_at: parse_timestamp(&lookup.resolve(fields::CREATED)).unwrap_or(now),
        justification: non_empty(lookup.resolve(fields::JUSTIFICATION)),
        escalation_date: non_empty(lookup.resolve(fields::ESCALATION_DATE)),
    }
}

fn build_infra(lookup: &RowLookup<'_>, plot: String, now: DateTime<Utc>) -> InfraPaymentRecord {
    InfraPaymentRecord {
        plot_number: plot,
        owner_name: lookup.resolve(fields::OWNER),
        application_number: lookup.resolve(fields::APPLICATION),
        first_payment: lookup.resolve(fields::FIRST_PAYMENT),
        second_payment: lookup.resolve(fields::SECOND_PAYMENT),
        third_payment: lookup.resolve(fields::THIRD_PAYMENT),
        created_at: parse_timestamp(&lookup.resolve(fields::CREATED)).unwrap_or(now),
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%b-%Y", "%Y/%m/%d"];

/// Parses the creation-date cell of an export.
///
/// RFC 3339 first, then a few naive forms read as UTC. Slash dates are
/// day-first.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return parsed.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use plotline_model::Stage;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn recognized_status_with_reference_is_project() {
        let row = RawRow::from_pairs([
            ("Status", "Site Visit"),
            ("Reference", "REF-001"),
            ("Plot", " 123A "),
        ]);
        let Classified::Project(project) = classify_row(&row, &DedupState::default(), now())
        else {
            panic!("expected project");
        };
        assert_eq!(project.stage, Stage::InDesign);
        assert_eq!(project.plot_number.as_deref(), Some("123A"));
        assert_eq!(project.reference_number, "REF-001");
        assert_eq!(project.created_at, now());
    }

    #[test]
    fn plot_without_status_is_infra() {
        let row = RawRow::from_pairs([
            ("Status", ""),
            ("Plot", "55B"),
            ("Initial Payment Date", "2024-01-01"),
            ("Owner Name", "M. Zulu"),
        ]);
        let Classified::Infra(infra) = classify_row(&row, &DedupState::default(), now()) else {
            panic!("expected infra");
        };
        assert_eq!(infra.plot_number, "55B");
        assert_eq!(infra.first_payment, "2024-01-01");
        assert_eq!(infra.owner_name, "M. Zulu");
        assert!(infra.is_fee_paid());
    }

    #[test]
    fn known_reference_is_discarded_regardless_of_status() {
        let dedup = DedupState::new(BTreeSet::from(["REF-001".to_string()]), BTreeSet::new());
        for status in ["Site Visit", "", "on hold"] {
            let row = RawRow::from_pairs([
                ("Status", status),
                ("Reference", "REF-001"),
                ("Plot", "9"),
            ]);
            assert_eq!(
                classify_row(&row, &dedup, now()),
                Classified::Discard(DiscardReason::DuplicateReference)
            );
        }
    }

    #[test]
    fn recognized_status_without_reference_is_still_project() {
        let row = RawRow::from_pairs([("Status", "Site Visit"), ("Plot", "9")]);
        let Classified::Project(project) = classify_row(&row, &DedupState::default(), now())
        else {
            panic!("expected project");
        };
        assert_eq!(project.reference_number, "");
        assert_eq!(project.plot_number.as_deref(), Some("9"));

        let row = RawRow::from_pairs([("Status", "Site Visit")]);
        assert!(matches!(
            classify_row(&row, &DedupState::default(), now()),
            Classified::Project(_)
        ));
    }

    #[test]
    fn blank_reference_is_not_a_dedup_key() {
        let mut dedup = DedupState::default();
        let row = RawRow::from_pairs([("Status", "GIS"), ("Plot", "77")]);
        let first = classify_row(&row, &dedup, now());
        dedup.record(&first);
        assert!(dedup.references.is_empty());
        assert!(matches!(classify_row(&row, &dedup, now()), Classified::Project(_)));
    }

    #[test]
    fn known_plot_is_discarded() {
        let dedup = DedupState::new(BTreeSet::new(), BTreeSet::from(["55B".to_string()]));
        let row = RawRow::from_pairs([("Plot", "55B ")]);
        assert_eq!(
            classify_row(&row, &dedup, now()),
            Classified::Discard(DiscardReason::DuplicatePlot)
        );
        let row = RawRow::from_pairs([("Plot", "55b")]);
        assert!(matches!(classify_row(&row, &dedup, now()), Classified::Infra(_)));
    }

    #[test]
    fn nothing_to_go_on_is_unclassifiable() {
        let row = RawRow::from_pairs([("Status", "on hold"), ("Zone", "North")]);
        assert_eq!(
            classify_row(&row, &DedupState::default(), now()),
            Classified::Discard(DiscardReason::Unclassifiable)
        );
    }

    #[test]
    fn creation_date_is_used_when_valid() {
        let row = RawRow::from_pairs([
            ("Status", "design"),
            ("Reference", "R-9"),
            ("Created At", "2023-07-04"),
        ]);
        let Classified::Project(project) = classify_row(&row, &DedupState::default(), now())
        else {
            panic!("expected project");
        };
        assert_eq!(project.created_at, Utc.with_ymd_and_hms(2023, 7, 4, 0, 0, 0).unwrap());

        let row = RawRow::from_pairs([
            ("Status", "design"),
            ("Reference", "R-10"),
            ("Created At", "last tuesday"),
        ]);
        let Classified::Project(project) = classify_row(&row, &DedupState::default(), now())
        else {
            panic!("expected project");
        };
        assert_eq!(project.created_at, now());
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05"), Some(expected));
        assert_eq!(parse_timestamp("05/03/2024"), Some(expected));
        assert_eq!(parse_timestamp("05-Mar-2024"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("31/31/2024"), None);
    }

    #[test]
    fn record_marks_keys_taken() {
        let mut dedup = DedupState::default();
        let row = RawRow::from_pairs([("Plot", "1")]);
        let classified = classify_row(&row, &dedup, now());
        dedup.record(&classified);
        assert!(dedup.infra_plots.contains("1"));
        assert_eq!(
            classify_row(&row, &dedup, now()),
            Classified::Discard(DiscardReason::DuplicatePlot)
        );
    }
}
