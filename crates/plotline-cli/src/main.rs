//! Plotline CLI.

use clap::{ColorChoice, Parser};
use plotline_cli::logging::{LogConfig, LogFormat, init_logging};
use plotline_cli::session::{connect, load_settings};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_clear_infra, run_delete, run_edit, run_import, run_paid, run_projects, run_search,
    run_statuses,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    if matches!(cli.command, Command::Statuses) {
        run_statuses();
        return Ok(0);
    }
    let settings = load_settings(cli.config.as_deref())?;
    let store = connect(
        cli.store.url.as_deref(),
        cli.store.key.as_deref(),
        cli.store.timeout_secs,
    )?;
    match cli.command {
        Command::Import(args) => {
            let code = match run_import(&store, &settings, &args).await? {
                Some(result) if result.error_count() > 0 => 1,
                _ => 0,
            };
            Ok(code)
        }
        Command::Projects(args) => run_projects(&store, &settings, &args).await.map(|()| 0),
        Command::Paid(args) => run_paid(&store, &settings, &args).await.map(|()| 0),
        Command::Search(args) => run_search(&store, &args).await.map(|()| 0),
        Command::Edit(args) => run_edit(&store, args).await.map(|()| 0),
        Command::Delete(args) => run_delete(&store, &args.id).await.map(|()| 0),
        Command::ClearInfra(_) => run_clear_infra(&store).await.map(|()| 0),
        Command::Statuses => {
            run_statuses();
            Ok(0)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level(level)
        .with_format(format)
        .with_timestamps(cli.log_timestamps)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(args: &[&str]) -> LogConfig {
        let cli = Cli::try_parse_from(args).expect("parse");
        log_config_from_cli(&cli)
    }

    #[test]
    fn logging_flags_reach_the_config() {
        let config = config_for(&[
            "plotline",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-timestamps",
            "--log-file",
            "plotline.log",
            "--log-data",
            "statuses",
        ]);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.with_timestamps);
        assert_eq!(config.log_file.as_deref(), Some(std::path::Path::new("plotline.log")));
        assert!(config.log_data);
        assert!(!config.use_env_filter);
        assert!(!config.with_ansi);
    }

    #[test]
    fn defaults_leave_room_for_rust_log() {
        let config = config_for(&["plotline", "statuses"]);
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(!config.with_timestamps);
        assert!(config.use_env_filter);
    }
}
