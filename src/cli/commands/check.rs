//! Validate wizard definition files

use console::style;
use miette::{Report, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::schema::DefinitionChecker;

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Definition files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let checker = DefinitionChecker::new()?;
    let total = args.files.len();
    let mut failed = 0;

    for path in &args.files {
        match checker.load_file(path) {
            Ok(wizard) => {
                if !global.quiet {
                    println!(
                        "{} {} ({} steps, {} fields)",
                        style("✓").green(),
                        path.display(),
                        wizard.len(),
                        wizard.fields().count()
                    );
                }
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {}", style("✗").red(), path.display());
                eprintln!("{:?}", Report::new(err));
            }
        }
    }

    if failed > 0 {
        return Err(miette::miette!(
            "{} of {} definition(s) failed validation",
            failed,
            total
        ));
    }
    Ok(())
}
