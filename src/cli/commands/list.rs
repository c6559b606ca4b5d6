//! List built-in wizards

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::schema::WizardRegistry;

#[derive(Debug, Serialize)]
struct WizardSummary {
    name: String,
    title: String,
    steps: usize,
    fields: usize,
}

fn summaries() -> Result<Vec<WizardSummary>> {
    let registry = WizardRegistry;
    registry
        .names()
        .into_iter()
        .map(|name| {
            let wizard = registry.load(&name)?;
            Ok(WizardSummary {
                title: wizard.title().unwrap_or(&name).to_string(),
                steps: wizard.len(),
                fields: wizard.fields().count(),
                name,
            })
        })
        .collect()
}

pub fn run(global: &GlobalOpts, config: &Config) -> Result<()> {
    let wizards = summaries()?;

    match global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Auto)
    {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&wizards).into_diagnostic()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&wizards).into_diagnostic()?),
        OutputFormat::Csv => {
            println!("name,title,steps,fields");
            for w in &wizards {
                println!("{},{},{},{}", escape_csv(&w.name), escape_csv(&w.title), w.steps, w.fields);
            }
        }
        OutputFormat::Auto => {
            println!("{:<16} {:<30} {:>5} {:>6}", "NAME", "TITLE", "STEPS", "FIELDS");
            println!("{}", "-".repeat(60));
            for w in &wizards {
                println!(
                    "{:<16} {:<30} {:>5} {:>6}",
                    w.name,
                    truncate_str(&w.title, 30),
                    w.steps,
                    w.fields
                );
            }
            if !global.quiet {
                println!("\nUse 'stepform show <name>' for field details");
            }
        }
    }
    Ok(())
}
