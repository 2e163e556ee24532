use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use plotline_core::{
    BatchCommitter, Classified, DedupState, ImportSettings, MemoryStore, classify_row,
    classify_status, normalize_plot, recognized_import_statuses, resolve_paid, stage,
};
use plotline_ingest::RawRow;
use plotline_model::{InfraPaymentRecord, Stage};
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

fn status_strategy() -> impl Strategy<Value = String> {
    let known: Vec<String> = recognized_import_statuses().map(str::to_string).collect();
    prop_oneof![
        proptest::sample::select(known),
        Just(String::new()),
        "[a-zA-Z ]{0,12}",
    ]
}

fn row_strategy() -> impl Strategy<Value = RawRow> {
    (
        status_strategy(),
        prop::option::of("R-[0-9]{1,2}"),
        prop::option::of(" ?P[0-9]{1,2} ?"),
    )
        .prop_map(|(status, reference, plot)| {
            let mut pairs = vec![("Status".to_string(), status)];
            if let Some(reference) = reference {
                pairs.push(("Reference".to_string(), reference));
            }
            if let Some(plot) = plot {
                pairs.push(("Plot".to_string(), plot));
            }
            RawRow::from_pairs(pairs)
        })
}

fn ledger(plot: &str, first: &str, second: &str) -> InfraPaymentRecord {
    InfraPaymentRecord {
        plot_number: plot.to_string(),
        owner_name: String::new(),
        application_number: String::new(),
        first_payment: first.to_string(),
        second_payment: second.to_string(),
        third_payment: String::new(),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

proptest! {
    #[test]
    fn plot_normalization_is_idempotent(value in ".{0,24}") {
        let once = normalize_plot(&value);
        prop_assert_eq!(normalize_plot(&once), once);
    }

    #[test]
    fn status_classification_is_total(status in ".{0,24}") {
        prop_assert!(Stage::ALL.contains(&classify_status(&status)));
    }

    #[test]
    fn every_row_lands_in_exactly_one_place(
        rows in prop::collection::vec(row_strategy(), 0..40),
        known_refs in prop::collection::btree_set("R-[0-9]", 0..4),
        known_plots in prop::collection::btree_set("P[0-9]", 0..4),
    ) {
        let batch = stage(&rows, &known_refs, &known_plots, Utc::now());
        let counts = batch.counts();
        prop_assert_eq!(counts.rows, rows.len());
        prop_assert_eq!(counts.projects + counts.infra + counts.discarded(), rows.len());
        prop_assert_eq!(batch.projects().len(), counts.projects);
        prop_assert_eq!(batch.infra().len(), counts.infra);

        let keyed: Vec<_> = batch
            .projects()
            .iter()
            .map(|p| p.reference_number.clone())
            .filter(|reference| !reference.is_empty())
            .collect();
        let references: BTreeSet<_> = keyed.iter().cloned().collect();
        prop_assert_eq!(references.len(), keyed.len());
        prop_assert!(references.is_disjoint(&known_refs));

        let plots: BTreeSet<_> = batch.infra().iter().map(|r| r.plot_number.clone()).collect();
        prop_assert_eq!(plots.len(), batch.infra().len());
        prop_assert!(plots.is_disjoint(&known_plots));
    }

    #[test]
    fn classification_ignores_nothing_but_its_inputs(row in row_strategy()) {
        let now = Utc::now();
        let dedup = DedupState::default();
        let first = classify_row(&row, &dedup, now);
        let second = classify_row(&row, &dedup, now);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn chunk_size_does_not_change_what_is_written(
        count in 0usize..60,
        chunk_size in 1usize..25,
    ) {
        let rows: Vec<RawRow> = (0..count)
            .map(|n| RawRow::from_pairs([("Plot", format!("P{n}"))]))
            .collect();
        let store = MemoryStore::new();
        let mut batch = stage(&rows, &BTreeSet::new(), &BTreeSet::new(), Utc::now());
        let settings = ImportSettings::default().with_infra_chunk_size(chunk_size);
        let result = runtime()
            .block_on(BatchCommitter::new(&store, settings).commit(&mut batch, &CancellationToken::new()))
            .expect("commit");

        prop_assert_eq!(result.infra_succeeded, count);
        prop_assert_eq!(store.infra_insert_calls(), count.div_ceil(chunk_size));
        let written: Vec<_> = store.infra_rows().into_iter().map(|r| r.plot_number).collect();
        let expected: Vec<_> = (0..count).map(|n| format!("P{n}")).collect();
        prop_assert_eq!(written, expected);
    }

    #[test]
    fn paid_set_does_not_depend_on_chunk_size(
        plots in prop::collection::vec(" ?[0-9]{1,2} ?", 0..40),
        ledger_rows in prop::collection::vec(("[0-9]{1,2}", any::<bool>(), any::<bool>()), 0..30),
        chunk_size in 1usize..45,
    ) {
        let store = MemoryStore::new().with_infra(ledger_rows.iter().map(|(plot, first, second)| {
            ledger(
                plot,
                if *first { "2024-01-01" } else { " " },
                if *second { "paid" } else { "" },
            )
        }));

        let rt = runtime();
        let whole = rt.block_on(resolve_paid(&store, &plots, plots.len().max(1)));
        let chunked = rt.block_on(resolve_paid(&store, &plots, chunk_size));
        prop_assert_eq!(chunked, whole);
    }

    #[test]
    fn adding_a_marker_never_unpays_a_plot(
        plots in prop::collection::btree_set("[0-9]{1,3}", 1..20),
        marked in prop::collection::vec(any::<bool>(), 20),
        extra in 0usize..20,
        chunk_size in 1usize..8,
    ) {
        let plots: Vec<String> = plots.into_iter().collect();
        let base: Vec<InfraPaymentRecord> = plots
            .iter()
            .zip(&marked)
            .map(|(plot, paid)| ledger(plot, if *paid { "2024-01-01" } else { "" }, ""))
            .collect();
        let target = &plots[extra % plots.len()];

        let before_store = MemoryStore::new().with_infra(base.clone());
        let after_store = MemoryStore::new()
            .with_infra(base.into_iter().chain([ledger(target, "", "paid")]));

        let rt = runtime();
        let before = rt.block_on(resolve_paid(&before_store, &plots, chunk_size));
        let after = rt.block_on(resolve_paid(&after_store, &plots, chunk_size));

        prop_assert!(before.is_subset(&after));
        prop_assert!(after.contains(target));
    }
}

#[test]
fn recognized_rows_without_known_keys_become_projects() {
    for status in recognized_import_statuses() {
        let row = RawRow::from_pairs([("Status", status), ("Reference", "R-new")]);
        assert!(
            matches!(
                classify_row(&row, &DedupState::default(), Utc::now()),
                Classified::Project(_)
            ),
            "{status}"
        );
    }
}
