//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - loads both datasets and runs the pipeline
//! - prints reports/plots, writes exports or starts the dashboard

use clap::Parser;
use tracing::info;

use crate::cli::{Command, DataArgs, ExportArgs, LogArgs, RunArgs};
use crate::error::AppError;
use crate::io::source::SourceSpec;
use crate::logging::{LogConfig, init_logging};
use crate::normalize::EmissionsSchema;

pub mod pipeline;

use pipeline::RunConfig;

/// Entry point for the `climate` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; values then come from the real environment or defaults.
    dotenvy::dotenv().ok();

    // We want `climate` and `climate -e x.csv` to behave like `climate tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    init_cli_logging(&cli.log, is_tui)?;

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// The dashboard owns the terminal, so it only logs when a file is given.
fn init_cli_logging(args: &LogArgs, is_tui: bool) -> Result<(), AppError> {
    if is_tui && args.log_file.is_none() {
        return Ok(());
    }
    let config = LogConfig::from_verbosity(args.verbose)
        .with_format(args.log_format)
        .with_log_file(args.log_file.clone());
    init_logging(&config)
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.data);
    let run = pipeline::load_and_run(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if !args.no_table {
        println!("{}", crate::report::format_aligned_table(&run.aligned));
    }

    if !args.no_plot {
        let plot = crate::plot::render_ascii_chart(&run.aligned, args.chart, args.width, args.height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.data);
    let run = pipeline::load_and_run(&config)?;

    crate::io::export::write_aligned(&args.out, &run.aligned, args.format)?;
    info!(path = %args.out.display(), years = run.aligned.len(), "exported aligned table");
    println!("Wrote {} aligned years to {}", run.aligned.len(), args.out.display());
    Ok(())
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    crate::tui::run(run_config_from_args(&args))
}

pub fn run_config_from_args(args: &DataArgs) -> RunConfig {
    RunConfig {
        emissions: SourceSpec::parse(&args.emissions),
        temperature: SourceSpec::parse(&args.temperature),
        temperature_header: args.temperature_header,
        schema: EmissionsSchema::new(args.year_keyword.as_str(), args.value_keyword.as_str()),
    }
}

/// Rewrite argv so `climate` defaults to `climate tui`.
///
/// Rules:
/// - `climate`                          -> `climate tui`
/// - `climate -e co2.csv ...`           -> `climate tui -e co2.csv ...`
/// - `climate -v run ...`               -> unchanged (global log flags may precede a subcommand)
/// - `climate --help/--version/-h/-V`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Skip the global logging flags to find the first token that decides.
    let mut idx = 1;
    while let Some(arg) = argv.get(idx) {
        match global_flag_width(arg) {
            Some(width) => idx += width,
            None => break,
        }
    }

    let Some(first) = argv.get(idx) else {
        argv.insert(1, "tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(first.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(first.as_str(), "run" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first deciding token is a flag, treat it as "tui flags".
    if first.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is and let clap report the unknown subcommand.
    argv
}

/// Number of argv tokens a global logging flag occupies, or `None` if `arg`
/// is not one.
fn global_flag_width(arg: &str) -> Option<usize> {
    match arg {
        "--verbose" => Some(1),
        "--log-format" | "--log-file" => Some(2),
        _ if arg.starts_with("--log-format=") || arg.starts_with("--log-file=") => Some(1),
        _ if arg.len() > 1 && arg.starts_with('-') && arg[1..].bytes().all(|b| b == b'v') => Some(1),
        _ => None,
    }
}
