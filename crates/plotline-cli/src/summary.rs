use std::collections::BTreeSet;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use plotline_core::{CommitOutcome, CommitResult, DetectedCounts, ProjectView};
use plotline_model::{InfraPaymentRecord, Stage};

pub fn print_staged(file: &str, counts: DetectedCounts) {
    println!("File: {file}");
    let mut table = Table::new();
    table.set_header(vec![header_cell("Detected"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("New projects"), count_cell(counts.projects, Color::Green)]);
    table.add_row(vec![Cell::new("New ledger rows"), count_cell(counts.infra, Color::Green)]);
    table.add_row(vec![
        dim_cell("Known reference"),
        count_cell(counts.duplicate_references, Color::Yellow),
    ]);
    table.add_row(vec![
        dim_cell("Known plot"),
        count_cell(counts.duplicate_plots, Color::Yellow),
    ]);
    table.add_row(vec![
        dim_cell("Unclassifiable"),
        count_cell(counts.unclassifiable, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(counts.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_commit(result: &CommitResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Written"),
        header_cell("Failed"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Projects"),
        Cell::new(result.projects_succeeded),
        count_cell(result.projects_failed, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("Ledger rows"),
        Cell::new(result.infra_succeeded),
        count_cell(result.infra_failed, Color::Red),
    ]);
    table.add_row(vec![
        dim_cell("Not attempted"),
        dim_cell("-"),
        count_cell(result.not_attempted, Color::Red),
    ]);
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.success_count()).add_attribute(Attribute::Bold),
        count_cell(result.error_count(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    match result.outcome {
        CommitOutcome::Completed => {}
        CommitOutcome::ChunkFailed { chunk, kind } => eprintln!(
            "Ledger import stopped at chunk {chunk} ({kind} error); re-import the file once the store is healthy."
        ),
        CommitOutcome::Cancelled => eprintln!("Import cancelled; remaining rows were not sent."),
        CommitOutcome::TimedOut => eprintln!("Import timed out; remaining rows were not sent."),
    }
}

pub fn print_projects(views: &[ProjectView]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Reference"),
        header_cell("Label"),
        header_cell("Stage"),
        header_cell("Plot"),
        header_cell("Zone"),
        header_cell("Fees"),
        header_cell("Created"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 6, CellAlignment::Center);
    for view in views {
        let project = &view.project;
        table.add_row(vec![
            dim_cell(project.id.as_str()),
            Cell::new(&project.reference_number)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&project.label),
            stage_cell(project.stage),
            text_cell(project.plot_number.as_deref().unwrap_or_default()),
            text_cell(&project.zone),
            fee_cell(view.fees_cleared),
            dim_cell(project.created_at.format("%Y-%m-%d")),
        ]);
    }
    println!("{table}");
    let cleared = views.iter().filter(|view| view.fees_cleared).count();
    println!("{} projects, {cleared} with fees cleared", views.len());
}

pub fn print_paid(requested: &[String], paid: &BTreeSet<String>) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Plot"), header_cell("Fees")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for plot in requested {
        let normalized = plotline_core::normalize_plot(plot);
        if normalized.is_empty() {
            continue;
        }
        let cleared = paid.contains(&normalized);
        table.add_row(vec![Cell::new(normalized), fee_cell(cleared)]);
    }
    println!("{table}");
}

pub fn print_ledger(rows: &[InfraPaymentRecord]) {
    if rows.is_empty() {
        println!("No ledger rows match.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Plot"),
        header_cell("Owner"),
        header_cell("Application"),
        header_cell("1st"),
        header_cell("2nd"),
        header_cell("3rd"),
        header_cell("Fees"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 6, CellAlignment::Center);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.plot_number)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            text_cell(&row.owner_name),
            text_cell(&row.application_number),
            text_cell(&row.first_payment),
            text_cell(&row.second_payment),
            text_cell(&row.third_payment),
            fee_cell(row.is_fee_paid()),
        ]);
    }
    println!("{table}");
}

pub fn print_statuses(statuses: &[(&str, Stage)]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Status"), header_cell("Stage")]);
    apply_table_style(&mut table);
    for (status, stage) in statuses {
        table.add_row(vec![Cell::new(status), stage_cell(*stage)]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stage_cell(stage: Stage) -> Cell {
    let color = match stage {
        Stage::InDesign => Color::Blue,
        Stage::Gis => Color::Magenta,
        Stage::Wayleave => Color::Yellow,
        Stage::Escalated => Color::Red,
        Stage::Passed => Color::Green,
    };
    Cell::new(stage.label()).fg(color)
}

fn fee_cell(cleared: bool) -> Cell {
    if cleared {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("outstanding").fg(Color::Yellow)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn text_cell(value: &str) -> Cell {
    if value.trim().is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
