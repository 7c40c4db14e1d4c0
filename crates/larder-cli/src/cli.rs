//! CLI argument definitions for Larder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "Larder - Normalize recipe and review extracts into a relational store",
    long_about = "Normalize the recipe catalog and review log into a relational\n\
                  schema: authors, categories, keywords, ingredients, recipes,\n\
                  and reviews, joined through surrogate-key relationships."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize both extracts and load the relational store.
    Run(RunArgs),

    /// List the output relations in load order.
    Tables,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the recipe catalog Parquet extract.
    #[arg(value_name = "RECIPES_PARQUET")]
    pub recipes: PathBuf,

    /// Path to the review log CSV extract.
    #[arg(value_name = "REVIEWS_CSV")]
    pub reviews: PathBuf,

    /// SQLite database to load (created if absent).
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Drop existing tables before creating them.
    #[arg(long = "drop-existing")]
    pub drop_existing: bool,

    /// Shape the relations and report, but skip the load phase.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run report as JSON to the given path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
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
