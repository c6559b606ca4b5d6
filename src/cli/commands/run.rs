//! Interactive terminal wizard
//!
//! Renders the current step of a [`WizardSession`], prompts for its fields
//! and forwards the chosen action (next, previous, submit) into the session.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::load_wizard;
use crate::cli::helpers::progress_bar;
use crate::cli::output::{write_output, SessionReport};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, StepStatus, Submission, WizardSession};
use crate::schema::FieldSpec;

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Built-in wizard name or path to a definition file
    pub wizard: Option<String>,

    /// Write the submitted record to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Show secret values on the review screen
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Previous,
    Submit,
    Cancel,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Next => "Next →",
            Action::Previous => "← Previous",
            Action::Submit => "Confirm & Submit",
            Action::Cancel => "Cancel",
        }
    }
}

/// Actions available at the current position
fn available_actions(session: &WizardSession) -> Vec<Action> {
    let mut actions = Vec::with_capacity(3);
    if session.is_review_step() {
        actions.push(Action::Submit);
    } else {
        actions.push(Action::Next);
    }
    if !session.is_first_step() {
        actions.push(Action::Previous);
    }
    actions.push(Action::Cancel);
    actions
}

pub fn run(args: RunArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let (name, wizard) = load_wizard(args.wizard.as_deref(), config)?;
    let mask_secrets = config.mask_secrets() && !args.show_secrets;
    let theme = ColorfulTheme::default();
    let mut session = WizardSession::new(wizard);

    print_banner(&session);

    loop {
        print_step_header(&session);

        if session.current_step().is_review() {
            print_review(&session, mask_secrets);
        } else {
            prompt_fields(&theme, &mut session)?;
        }

        let actions = available_actions(&session);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let selection = Select::with_theme(&theme)
            .with_prompt("Continue")
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;

        match actions[selection] {
            Action::Next => {
                if !session.advance() {
                    print_errors(&session);
                }
            }
            Action::Previous => {
                session.retreat();
            }
            Action::Submit => match session.submit() {
                Submission::Accepted(record) => {
                    let format = global
                        .format
                        .resolve(config.default_format.as_deref(), OutputFormat::Yaml);
                    let report = SessionReport::new(&name, &session, Some(&record));
                    write_output(&report.render(format)?, args.output.as_deref())?;
                    if !global.quiet {
                        eprintln!("{} Submitted {}", style("✓").green().bold(), name);
                    }
                    return Ok(());
                }
                Submission::Rejected(_) => print_errors(&session),
            },
            Action::Cancel => {
                if !global.quiet {
                    eprintln!("{} Wizard cancelled, nothing submitted", style("✗").yellow());
                }
                return Ok(());
            }
        }
    }
}

fn print_banner(session: &WizardSession) {
    let config = session.config();
    eprintln!();
    if let Some(title) = config.title() {
        eprintln!("{} {}", style("◆").cyan(), style(title).bold());
    }
    match config.description() {
        Some(description) => eprintln!("{}", style(description).dim()),
        None => eprintln!(
            "{}",
            style(format!("Complete all {} steps to finish", session.step_count())).dim()
        ),
    }
    eprintln!("{}", style("─".repeat(50)).dim());
}

fn print_step_header(session: &WizardSession) {
    let indicator: Vec<String> = session
        .config()
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let marker = step.icon.clone().unwrap_or_else(|| (index + 1).to_string());
            match session.step_status(index) {
                StepStatus::Completed => style(marker).green().to_string(),
                StepStatus::Active => style(format!("[{}]", marker)).cyan().bold().to_string(),
                StepStatus::Upcoming => style(marker).dim().to_string(),
            }
        })
        .collect();

    eprintln!();
    eprintln!("{}", indicator.join(" ─ "));
    eprintln!(
        "{} {:.0}% Complete",
        progress_bar(session.progress(), 30),
        session.progress_percent().round()
    );
    eprintln!();

    let step = session.current_step();
    if step.is_review() {
        eprintln!("{}", style("Review Your Information").bold());
    } else {
        eprintln!(
            "{} {}",
            style(format!(
                "Step {}/{}",
                session.current_step_index() + 1,
                session.step_count()
            ))
            .cyan(),
            style(&step.title).bold()
        );
    }
}

fn print_review(session: &WizardSession, mask_secrets: bool) {
    let width = session
        .review()
        .iter()
        .map(|entry| entry.label.chars().count())
        .max()
        .unwrap_or(0);

    for entry in session.review() {
        let value = entry.display_value(mask_secrets);
        let value = if entry.value.is_empty() {
            style(value.into_owned()).dim().to_string()
        } else {
            value.into_owned()
        };
        eprintln!("  {:<width$}  {}", style(entry.label).bold(), value, width = width);
    }
    eprintln!();
}

fn print_errors(session: &WizardSession) {
    for message in session.errors().values() {
        eprintln!("  {} {}", style("✗").red(), style(message).red());
    }
}

/// What to do with a secret that already holds a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretEdit {
    Keep,
    Replace,
    Clear,
}

impl SecretEdit {
    const ALL: [SecretEdit; 3] = [SecretEdit::Keep, SecretEdit::Replace, SecretEdit::Clear];

    fn label(&self) -> &'static str {
        match self {
            SecretEdit::Keep => "Keep current value",
            SecretEdit::Replace => "Enter a new value",
            SecretEdit::Clear => "Clear",
        }
    }

    /// Resulting value; `entered` is only read for `Replace`
    fn apply(self, current: &str, entered: Option<String>) -> String {
        match self {
            SecretEdit::Keep => current.to_string(),
            SecretEdit::Replace => entered.unwrap_or_default(),
            SecretEdit::Clear => String::new(),
        }
    }
}

fn prompt_secret(theme: &ColorfulTheme, prompt: String, current: &str) -> Result<String> {
    let edit = if current.is_empty() {
        SecretEdit::Replace
    } else {
        let labels: Vec<&str> = SecretEdit::ALL.iter().map(SecretEdit::label).collect();
        let selection = Select::with_theme(theme)
            .with_prompt(format!("{} {}", prompt, style("(already set)").dim()))
            .items(&labels)
            .default(0)
            .interact()
            .into_diagnostic()?;
        SecretEdit::ALL[selection]
    };

    let entered = if edit == SecretEdit::Replace {
        Some(
            Password::with_theme(theme)
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
                .into_diagnostic()?,
        )
    } else {
        None
    };
    Ok(edit.apply(current, entered))
}

/// Prompt text with the field's pending error, if any
fn format_prompt(field: &FieldSpec, error: Option<&str>) -> String {
    let mut prompt = field.label.clone();
    if field.required {
        prompt.push_str(" *");
    }
    if let Some(placeholder) = &field.placeholder {
        prompt.push_str(&format!(" ({})", style(placeholder).dim()));
    }
    if let Some(error) = error {
        prompt.push_str(&format!(" {}", style(error).red()));
    }
    prompt
}

fn prompt_fields(theme: &ColorfulTheme, session: &mut WizardSession) -> Result<()> {
    let fields = session.current_step().fields.clone();

    for field in &fields {
        let current = session.value(&field.name).unwrap_or("").to_string();
        let prompt = format_prompt(field, session.error(&field.name));

        let value = if field.kind.is_secret() {
            prompt_secret(theme, prompt, &current)?
        } else {
            Input::<String>::with_theme(theme)
                .with_prompt(prompt)
                .with_initial_text(current.clone())
                .allow_empty(true)
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    match field.max_length {
                        Some(limit) if !field.accepts_length(input) => {
                            Err(format!("At most {} characters", limit))
                        }
                        _ => Ok(()),
                    }
                })
                .interact_text()
                .into_diagnostic()?
        };

        // Unchanged input is not an edit; a pending error stays visible
        if value != current {
            session.update_field(&field.name, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WizardRegistry;

    #[test]
    fn test_actions_follow_position() {
        let mut session = WizardSession::new(WizardRegistry.load("newsletter").unwrap());
        assert_eq!(available_actions(&session), [Action::Next, Action::Cancel]);

        session.update_field("email", "a@b.com").unwrap();
        assert!(session.advance());
        assert_eq!(
            available_actions(&session),
            [Action::Submit, Action::Previous, Action::Cancel]
        );
    }

    #[test]
    fn test_secret_can_be_cleared() {
        assert_eq!(SecretEdit::Keep.apply("hunter2", None), "hunter2");
        assert_eq!(SecretEdit::Clear.apply("hunter2", None), "");
        assert_eq!(
            SecretEdit::Replace.apply("hunter2", Some("swordfish".to_string())),
            "swordfish"
        );
        assert_eq!(SecretEdit::Replace.apply("hunter2", Some(String::new())), "");
    }

    #[test]
    fn test_cleared_secret_is_stored_empty() {
        let mut session = WizardSession::new(WizardRegistry.load("registration").unwrap());
        session.update_field("pword", "hunter2").unwrap();
        let cleared = SecretEdit::Clear.apply(session.value("pword").unwrap(), None);
        session.update_field("pword", cleared).unwrap();
        assert_eq!(session.value("pword"), Some(""));
    }

    #[test]
    fn test_prompt_mentions_error() {
        let field = FieldSpec::new("dd", "DD").required();
        let prompt = format_prompt(&field, Some("Invalid format for DD"));
        assert!(prompt.starts_with("DD *"));
        assert!(prompt.contains("Invalid format for DD"));
    }
}
