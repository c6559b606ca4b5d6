//! Show the steps and fields of a wizard

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{load_wizard, wizard_source};
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::schema::{WizardConfig, WizardDefinition};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Built-in wizard name or path to a definition file
    pub wizard: Option<String>,

    /// Print the definition source instead of a summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: ShowArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    if args.raw {
        print!("{}", wizard_source(args.wizard.as_deref(), config)?);
        return Ok(());
    }

    let (name, wizard) = load_wizard(args.wizard.as_deref(), config)?;

    match global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Auto)
    {
        OutputFormat::Yaml => {
            let definition = WizardDefinition::from(&wizard);
            print!("{}", serde_yml::to_string(&definition).into_diagnostic()?);
        }
        OutputFormat::Json => {
            let definition = WizardDefinition::from(&wizard);
            println!("{}", serde_json::to_string_pretty(&definition).into_diagnostic()?);
        }
        OutputFormat::Csv => print!("{}", fields_csv(&wizard)),
        OutputFormat::Auto => {
            let title = wizard.title().unwrap_or(&name);
            println!("{}", title);
            println!("{}", "=".repeat(title.chars().count()));
            if let Some(description) = wizard.description() {
                println!("{}\n", description);
            }
            println!("{}", fields_table(&wizard));
        }
    }
    Ok(())
}

/// One row per field; field-less steps get a single review row
fn table_rows(wizard: &WizardConfig) -> Vec<[String; 8]> {
    let mut rows = Vec::new();
    for (index, step) in wizard.steps().iter().enumerate() {
        let step_label = match &step.icon {
            Some(icon) => format!("{} {}", icon, step.title),
            None => step.title.clone(),
        };

        if step.is_review() {
            rows.push([
                (index + 1).to_string(),
                step_label,
                "(review)".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
            continue;
        }

        for (position, field) in step.fields.iter().enumerate() {
            rows.push([
                if position == 0 { (index + 1).to_string() } else { String::new() },
                if position == 0 { step_label.clone() } else { String::new() },
                field.name.clone(),
                field.label.clone(),
                field.kind.to_string(),
                if field.required { "yes".to_string() } else { String::new() },
                field.pattern.as_ref().map(|p| p.to_string()).unwrap_or_default(),
                field.max_length.map(|m| m.to_string()).unwrap_or_default(),
            ]);
        }
    }
    rows
}

fn fields_table(wizard: &WizardConfig) -> String {
    let mut builder = Builder::default();
    builder.push_record(["#", "STEP", "FIELD", "LABEL", "KIND", "REQ", "PATTERN", "MAX"]);
    for row in table_rows(wizard) {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn fields_csv(wizard: &WizardConfig) -> String {
    let mut out = String::from("step,step_title,name,label,kind,required,pattern,max_length\n");
    for (index, step) in wizard.steps().iter().enumerate() {
        for field in &step.fields {
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                index + 1,
                escape_csv(&step.title),
                escape_csv(&field.name),
                escape_csv(&field.label),
                field.kind,
                field.required,
                escape_csv(field.pattern.as_ref().map(|p| p.as_str()).unwrap_or("")),
                field.max_length.map(|m| m.to_string()).unwrap_or_default()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WizardRegistry;

    #[test]
    fn test_rows_cover_fields_and_review() {
        let wizard = WizardRegistry.load("registration").unwrap();
        let rows = table_rows(&wizard);
        // nine fields plus the review row
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[1][0], "");
        assert_eq!(rows[1][2], "lname");
        assert_eq!(rows[9][2], "(review)");

        let dd = rows.iter().find(|r| r[2] == "dd").unwrap();
        assert_eq!(dd[6], "[0-9]*");
        assert_eq!(dd[7], "2");
    }

    #[test]
    fn test_fields_csv() {
        let wizard = WizardRegistry.load("newsletter").unwrap();
        let csv = fields_csv(&wizard);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1,Subscriber,email,E-mail,email,true,,");
        assert_eq!(lines[2], "1,Subscriber,nickname,Nickname,text,false,,32");
    }
}
