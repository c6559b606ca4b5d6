//! Shell completions for the stepform CLI
//!
//! Completes subcommands, global flags (`--format`, `--quiet`, `--verbose`)
//! and per-command options such as `replay --events` and `run --show-secrets`.
//! Wizard names are free-form (built-in name or definition path), so they are
//! completed as plain values.
//!
//! ```bash
//! source <(stepform completions bash)
//! stepform completions fish > ~/.config/fish/completions/stepform.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

/// Binary name the completion scripts are registered for
pub const BIN_NAME: &str = "stepform";

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` into `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout());
    Ok(())
}
