use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use gridplay_core::SolverKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridplay", author, version, about = "DC power flow for gridplay levels", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve the DC power flow of a scenario and report every line
    Solve {
        #[command(flatten)]
        source: ScenarioSource,

        /// Linear system backend
        #[arg(long, default_value = "gauss")]
        solver: SolverKind,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Extra actions (JSON or YAML list) applied after the scenario's own
        #[arg(long, value_hint = ValueHint::FilePath)]
        action_file: Option<PathBuf>,

        /// Solve islands concurrently
        #[arg(long)]
        parallel: bool,
    },
    /// Show how a scenario splits into islands
    Islands {
        #[command(flatten)]
        source: ScenarioSource,
    },
    /// Show total generation, load and net balance
    Balance {
        #[command(flatten)]
        source: ScenarioSource,
    },
    /// List built-in levels
    Presets,
}

/// Where a command reads its scenario from: a file or a built-in level.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ScenarioSource {
    /// Scenario file (JSON or YAML)
    #[arg(value_hint = ValueHint::FilePath)]
    pub scenario: Option<PathBuf>,

    /// Built-in level (see `gridplay presets`)
    #[arg(long)]
    pub preset: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON document on stdout
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
