//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, replay::ReplayArgs, run::RunArgs,
    show::ShowArgs,
};

#[derive(Parser)]
#[command(name = "stepform")]
#[command(author, version, about = "Validated multi-step form wizards")]
#[command(long_about = "Run multi-step form wizards in the terminal. Each step is validated before the next one opens, and the last step reviews the collected record before submission.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a wizard interactively
    Run(RunArgs),

    /// Apply a scripted list of events to a wizard
    Replay(ReplayArgs),

    /// Validate a wizard definition file
    Check(CheckArgs),

    /// Show the steps and fields of a wizard
    Show(ShowArgs),

    /// List built-in wizards
    List,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically pick (yaml for records, table for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
}

impl OutputFormat {
    /// Parse a format name from configuration
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }

    /// Resolve `Auto` against a configured default, then `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        match self {
            OutputFormat::Auto => configured
                .and_then(Self::from_config)
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(fallback),
            other => other,
        }
    }
}
