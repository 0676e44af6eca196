//! Command-line parsing for the `climate` binary.
//!
//! Parsing and dispatch stay here and in `app`; nothing below the pipeline
//! knows about flags or environment variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ChartKind, ExportFormat};
use crate::logging::LogFormat;
use crate::schema::{DEFAULT_VALUE_KEYWORD, DEFAULT_YEAR_KEYWORD};

/// Default emissions file, looked up in the working directory.
pub const DEFAULT_EMISSIONS_SOURCE: &str = "Co2_Emissions_by_Sectors.csv";
/// Default temperature-anomaly file, looked up in the working directory.
pub const DEFAULT_TEMPERATURE_SOURCE: &str = "hadcrut-monthly-ns-avg.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "climate",
    version,
    about = "Align CO2 emissions with temperature anomalies by year"
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline and print a summary, the aligned table and a chart.
    Run(RunArgs),
    /// Run the pipeline and write the aligned table to a file.
    Export(ExportArgs),
    /// Launch the interactive dashboard.
    Tui(DataArgs),
}

/// Logging flags, accepted before or after the subcommand.
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Write logs to a file instead of stderr (the TUI only logs when this is set).
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where the two datasets come from and how to read them.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Emissions CSV (path or http(s) URL).
    #[arg(
        short = 'e',
        long,
        env = "CLIMATE_EMISSIONS_SOURCE",
        default_value = DEFAULT_EMISSIONS_SOURCE
    )]
    pub emissions: String,

    /// Temperature-anomaly CSV (path or http(s) URL).
    #[arg(
        short = 't',
        long,
        env = "CLIMATE_TEMPERATURE_SOURCE",
        default_value = DEFAULT_TEMPERATURE_SOURCE
    )]
    pub temperature: String,

    /// Skip one header line at the top of the temperature file.
    #[arg(long)]
    pub temperature_header: bool,

    /// Keyword identifying the emissions year column.
    #[arg(long, env = "CLIMATE_YEAR_KEYWORD", default_value = DEFAULT_YEAR_KEYWORD)]
    pub year_keyword: String,

    /// Keyword identifying the emissions value column.
    #[arg(long, env = "CLIMATE_VALUE_KEYWORD", default_value = DEFAULT_VALUE_KEYWORD)]
    pub value_keyword: String,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which chart to draw.
    #[arg(long, value_enum, default_value_t = ChartKind::Dual)]
    pub chart: ChartKind,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Do not print the aligned table.
    #[arg(long)]
    pub no_table: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output file.
    #[arg(short, long, value_name = "PATH")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}
