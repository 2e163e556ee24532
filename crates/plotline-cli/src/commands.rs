use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use plotline_cli::logging::redact_value;
use plotline_cli::session::parse_confirmation;
use plotline_core::{
    BatchCommitter, CommitResult, ImportSettings, ProjectForm, RecordStore, annotate_fee_status,
    classify_status, delete_project, edit_project, recognized_import_statuses, resolve_paid,
    search_ledger, stage_from_store,
};
use plotline_ingest::read_sheet;
use plotline_model::{ProjectId, Stage};

use crate::cli::{EditArgs, ImportArgs, PaidArgs, ProjectsArgs, SearchArgs};
use crate::summary::{
    print_commit, print_ledger, print_paid, print_projects, print_staged, print_statuses,
};

/// Stages `args.file`, asks for confirmation and commits.
///
/// Returns `None` when nothing was written: a dry run, a declined prompt or
/// an empty batch.
pub async fn run_import<S: RecordStore + ?Sized>(
    store: &S,
    settings: &ImportSettings,
    args: &ImportArgs,
) -> Result<Option<CommitResult>> {
    let file = args.file.display().to_string();
    let span = info_span!("import", file = %file);
    async {
        let sheet = read_sheet(&args.file).with_context(|| format!("read {file}"))?;
        info!(rows = sheet.rows.len(), columns = sheet.headers.len(), "sheet loaded");

        let mut batch = stage_from_store(store, &sheet.rows, Utc::now())
            .await
            .context("stage import")?;
        print_staged(&file, batch.counts());

        if batch.is_empty() {
            println!("Nothing new to import.");
            batch.cancel().context("close empty batch")?;
            return Ok(None);
        }
        if args.dry_run {
            println!("Dry run; nothing was written.");
            batch.cancel().context("close dry run")?;
            return Ok(None);
        }
        if !args.yes && !confirm(&batch_prompt(batch.projects().len(), batch.infra().len())).await? {
            println!("Import cancelled; nothing was written.");
            batch.cancel().context("cancel import")?;
            return Ok(None);
        }

        let token = CancellationToken::new();
        let watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received; stopping import");
                    token.cancel();
                }
            }
        });
        let committed = BatchCommitter::new(store, settings.clone())
            .commit(&mut batch, &token)
            .await;
        watcher.abort();
        let result = committed.context("commit import")?;
        print_commit(&result);

        let projects = store
            .list_projects()
            .await
            .context("reload projects after import")?;
        let views = annotate_fee_status(store, projects, settings.paid_chunk_size).await;
        let cleared = views.iter().filter(|view| view.fees_cleared).count();
        println!("{} projects on record, {cleared} with fees cleared", views.len());
        Ok(Some(result))
    }
    .instrument(span)
    .await
}

fn batch_prompt(projects: usize, infra: usize) -> String {
    format!("Commit {projects} projects and {infra} ledger rows? [y/N] ")
}

async fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush().context("flush prompt")?;
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await
    .context("prompt task")?
    .context("read confirmation")?;
    Ok(parse_confirmation(&answer))
}

pub async fn run_projects<S: RecordStore + ?Sized>(
    store: &S,
    settings: &ImportSettings,
    args: &ProjectsArgs,
) -> Result<()> {
    let stage = args
        .stage
        .as_deref()
        .map(str::parse::<Stage>)
        .transpose()
        .map_err(|err| anyhow!(err))?;
    let mut projects = store.list_projects().await.context("list projects")?;
    if let Some(stage) = stage {
        projects.retain(|project| project.stage == stage);
    }
    let mut views = annotate_fee_status(store, projects, settings.paid_chunk_size).await;
    if args.cleared {
        views.retain(|view| view.fees_cleared);
    } else if args.outstanding {
        views.retain(|view| !view.fees_cleared);
    }
    print_projects(&views);
    Ok(())
}

pub async fn run_paid<S: RecordStore + ?Sized>(
    store: &S,
    settings: &ImportSettings,
    args: &PaidArgs,
) -> Result<()> {
    let paid = resolve_paid(store, &args.plots, settings.paid_chunk_size).await;
    debug!(requested = args.plots.len(), paid = paid.len(), "fee status resolved");
    print_paid(&args.plots, &paid);
    Ok(())
}

pub async fn run_search<S: RecordStore + ?Sized>(store: &S, args: &SearchArgs) -> Result<()> {
    let rows = search_ledger(store, &args.fragment)
        .await
        .context("search ledger")?;
    for row in &rows {
        debug!(plot = %row.plot_number, owner = redact_value(&row.owner_name), "ledger match");
    }
    print_ledger(&rows);
    Ok(())
}

pub async fn run_edit<S: RecordStore + ?Sized>(store: &S, args: EditArgs) -> Result<()> {
    let id = ProjectId::new(args.id.as_str()).context("project id")?;
    let form = ProjectForm {
        label: args.label.unwrap_or_default(),
        stage: args.stage.unwrap_or_default(),
        plot_number: args.plot_number.unwrap_or_default(),
        zone: args.zone.unwrap_or_default(),
        block: args.block.unwrap_or_default(),
        wayleave_number: args.wayleave_number.unwrap_or_default(),
        account_number: args.account_number.unwrap_or_default(),
        justification: args.justification.unwrap_or_default(),
        escalation_date: args.escalation_date.unwrap_or_default(),
    };
    let updated = edit_project(store, &id, &form)
        .await
        .with_context(|| format!("edit project {id}"))?;
    println!(
        "Updated {} ({}): stage {}",
        updated.id, updated.reference_number, updated.stage
    );
    Ok(())
}

pub async fn run_delete<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<()> {
    let id = ProjectId::new(id).context("project id")?;
    delete_project(store, &id)
        .await
        .with_context(|| format!("delete project {id}"))?;
    println!("Deleted project {id}");
    Ok(())
}

pub async fn run_clear_infra<S: RecordStore + ?Sized>(store: &S) -> Result<()> {
    let removed = store
        .clear_infra_payments()
        .await
        .context("clear fee ledger")?;
    info!(removed, "fee ledger cleared");
    println!("Removed {removed} ledger rows");
    Ok(())
}

pub fn run_statuses() {
    let statuses: Vec<(&str, Stage)> = recognized_import_statuses()
        .map(|status| (status, classify_status(status)))
        .collect();
    print_statuses(&statuses);
}
