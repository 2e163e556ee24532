//! CLI argument definitions for `plotline`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "plotline",
    version,
    about = "Import connection-project spreadsheets and check plot fee status",
    long_about = "Import connection-project spreadsheets and check plot fee status.\n\n\
                  Rows are routed to new projects or to the infrastructure-fee ledger,\n\
                  reviewed, and then committed to the record store."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Import settings file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Prefix log lines with a timestamp (pretty and compact formats).
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow owner names and other row values in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

/// Record store connection.
#[derive(Args)]
pub struct StoreArgs {
    /// REST root of the record store.
    #[arg(
        long = "store-url",
        env = "PLOTLINE_STORE_URL",
        value_name = "URL",
        global = true
    )]
    pub url: Option<String>,

    /// API key for the record store.
    #[arg(
        long = "store-key",
        env = "PLOTLINE_STORE_KEY",
        value_name = "KEY",
        hide_env_values = true,
        global = true
    )]
    pub key: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(
        long = "store-timeout",
        value_name = "SECS",
        default_value_t = 30,
        global = true
    )]
    pub timeout_secs: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage a spreadsheet export, review it, and commit it.
    Import(ImportArgs),

    /// List projects with their fee status.
    Projects(ProjectsArgs),

    /// Show which of the given plots have cleared fees.
    Paid(PaidArgs),

    /// Search the fee ledger by partial plot number.
    Search(SearchArgs),

    /// Edit a project. Blank or omitted fields are left unchanged.
    Edit(EditArgs),

    /// Delete a project.
    Delete(DeleteArgs),

    /// Remove every row of the fee ledger.
    ClearInfra(ClearInfraArgs),

    /// List the recognized workflow statuses and their stages.
    Statuses,
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Spreadsheet export (.xlsx, .xls, .ods, .csv, .txt or .json).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Commit without asking for confirmation.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Stage and report only; never write.
    #[arg(long = "dry-run", conflicts_with = "yes")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ProjectsArgs {
    /// Only show projects in this stage (key or label, e.g. `gis` or `WL-GSN`).
    #[arg(long = "stage", value_name = "STAGE")]
    pub stage: Option<String>,

    /// Only show projects whose fees are cleared.
    #[arg(long = "cleared", conflicts_with = "outstanding")]
    pub cleared: bool,

    /// Only show projects whose fees are outstanding.
    #[arg(long = "outstanding")]
    pub outstanding: bool,
}

#[derive(Parser)]
pub struct PaidArgs {
    /// Plot numbers to check.
    #[arg(value_name = "PLOT", required = true)]
    pub plots: Vec<String>,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Part of a plot number; case is ignored.
    #[arg(value_name = "FRAGMENT")]
    pub fragment: String,
}

#[derive(Parser)]
pub struct EditArgs {
    /// Project id.
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub label: Option<String>,

    /// Stage key or label.
    #[arg(long)]
    pub stage: Option<String>,

    #[arg(long = "plot")]
    pub plot_number: Option<String>,

    #[arg(long)]
    pub zone: Option<String>,

    #[arg(long)]
    pub block: Option<String>,

    #[arg(long = "wayleave")]
    pub wayleave_number: Option<String>,

    #[arg(long = "account")]
    pub account_number: Option<String>,

    #[arg(long)]
    pub justification: Option<String>,

    /// Required when moving a project to USP.
    #[arg(long = "escalation-date", value_name = "DATE")]
    pub escalation_date: Option<String>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Project id.
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Parser)]
pub struct ClearInfraArgs {
    /// Confirm removing every ledger row.
    #[arg(long = "yes", required = true)]
    pub yes: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_flags_parse() {
        let cli = Cli::try_parse_from([
            "plotline",
            "--store-url",
            "http://localhost:3000",
            "import",
            "march.csv",
            "--yes",
        ])
        .unwrap();
        assert_eq!(cli.store.url.as_deref(), Some("http://localhost:3000"));
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.yes);
        assert!(!args.dry_run);
    }

    #[test]
    fn clear_infra_requires_yes() {
        assert!(Cli::try_parse_from(["plotline", "clear-infra"]).is_err());
    }
}
