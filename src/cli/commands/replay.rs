//! Apply a scripted list of events to a wizard session
//!
//! The events file is a YAML list:
//!
//! ```yaml
//! - update: { field: email, value: a@b.com }
//! - advance
//! - retreat
//! - submit
//! ```
//!
//! Replay stops at the first accepted submit. The resulting state (and the
//! record, when submitted) is printed in the selected format.

use console::style;
use miette::{Diagnostic, IntoDiagnostic, Result};
use serde::{de::Error as _, Deserialize, Deserializer};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::cli::commands::utils::load_wizard;
use crate::cli::output::{write_output, SessionReport};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Record, Submission, WizardError, WizardSession};
use crate::yaml::YamlSyntaxError;

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// Built-in wizard name or path to a definition file
    pub wizard: Option<String>,

    /// YAML file with the events to apply ("-" reads stdin)
    #[arg(long, short = 'e')]
    pub events: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Fail unless the script ends with an accepted submit
    #[arg(long)]
    pub require_submit: bool,
}

/// A user action forwarded into the session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Update {
        field: String,
        #[serde(deserialize_with = "scalar_string")]
        value: String,
    },
    Advance,
    Retreat,
    Submit,
}

/// Accept any YAML scalar as a field value, so `value: 12` reads as "12"
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_yml::Value::deserialize(deserializer)? {
        serde_yml::Value::String(s) => Ok(s),
        serde_yml::Value::Number(n) => Ok(n.to_string()),
        serde_yml::Value::Bool(b) => Ok(b.to_string()),
        serde_yml::Value::Null => Ok(String::new()),
        _ => Err(D::Error::custom("value must be a string, number or boolean")),
    }
}

/// Errors reading an events document
#[derive(Debug, Error, Diagnostic)]
pub enum EventsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Invalid event script {filename}: {message}")]
    #[diagnostic(
        code(stepform::replay::invalid_events),
        help("Each entry is `advance`, `retreat`, `submit` or an `update` with a field and a value")
    )]
    Shape { filename: String, message: String },
}

/// Parse an events document
///
/// YAML that does not parse is a syntax error; a well-formed document with
/// the wrong layout is a shape error.
pub fn parse_events(content: &str, filename: &str) -> Result<Vec<Event>, EventsError> {
    let document: serde_yml::Value = serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename))?;
    serde_yml::from_value(document).map_err(|e| EventsError::Shape {
        filename: filename.to_string(),
        message: e.to_string(),
    })
}

/// Apply events in order, stopping at the first accepted submit
pub fn apply_events(session: &mut WizardSession, events: &[Event]) -> Result<Option<Record>, WizardError> {
    for (index, event) in events.iter().enumerate() {
        debug!(index, ?event, "replaying event");
        match event {
            Event::Update { field, value } => session.update_field(field, value.as_str())?,
            Event::Advance => {
                session.advance();
            }
            Event::Retreat => {
                session.retreat();
            }
            Event::Submit => {
                if let Submission::Accepted(record) = session.submit() {
                    return Ok(Some(record));
                }
            }
        }
    }
    Ok(None)
}

fn read_events(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content).into_diagnostic()?;
        Ok((content, "<stdin>".to_string()))
    } else {
        let content = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
        Ok((content, path.display().to_string()))
    }
}

pub fn run(args: ReplayArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let (name, wizard) = load_wizard(args.wizard.as_deref(), config)?;
    let (content, filename) = read_events(&args.events)?;
    let events = parse_events(&content, &filename)?;

    let mut session = WizardSession::new(wizard);
    let record = apply_events(&mut session, &events)?;

    let format = global
        .format
        .resolve(config.default_format.as_deref(), OutputFormat::Yaml);
    let report = SessionReport::new(&name, &session, record.as_ref());
    write_output(&report.render(format)?, args.output.as_deref())?;

    if args.output.is_some() && !global.quiet {
        eprintln!(
            "{} Wrote report to {}",
            style("✓").green(),
            args.output.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
        );
    }

    if args.require_submit && record.is_none() {
        return Err(miette::miette!(
            help = "End the script with `- submit` on a valid step",
            "Wizard was not submitted (stopped at step {} of {}, {} pending error(s))",
            session.current_step_index() + 1,
            session.step_count(),
            session.errors().len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::WizardRegistry;

    fn newsletter() -> WizardSession {
        WizardSession::new(WizardRegistry.load("newsletter").unwrap())
    }

    #[test]
    fn test_parse_events() {
        let events = parse_events(
            "- update: { field: email, value: a@b.com }\n- advance\n- retreat\n- submit\n",
            "events.yaml",
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                Event::Update {
                    field: "email".to_string(),
                    value: "a@b.com".to_string()
                },
                Event::Advance,
                Event::Retreat,
                Event::Submit,
            ]
        );
    }

    #[test]
    fn test_parse_events_rejects_unknown_action() {
        assert!(matches!(
            parse_events("- jump\n", "events.yaml"),
            Err(EventsError::Shape { .. })
        ));
    }

    #[test]
    fn test_parse_events_syntax_error() {
        assert!(matches!(
            parse_events("- update: { field: dd\n", "events.yaml"),
            Err(EventsError::Syntax(_))
        ));
    }

    #[test]
    fn test_parse_events_accepts_unquoted_scalars() {
        let events = parse_events(
            "- update: { field: dd, value: 10 }\n- update: { field: ok, value: true }\n- update: { field: nickname, value: ~ }\n",
            "events.yaml",
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                Event::Update {
                    field: "dd".to_string(),
                    value: "10".to_string()
                },
                Event::Update {
                    field: "ok".to_string(),
                    value: "true".to_string()
                },
                Event::Update {
                    field: "nickname".to_string(),
                    value: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_parse_events_rejects_nested_value() {
        assert!(matches!(
            parse_events("- update: { field: dd, value: [1, 2] }\n", "events.yaml"),
            Err(EventsError::Shape { .. })
        ));
    }

    #[test]
    fn test_apply_until_submit() {
        let mut session = newsletter();
        let events = vec![
            Event::Update {
                field: "email".to_string(),
                value: "a@b.com".to_string(),
            },
            Event::Advance,
            Event::Submit,
            Event::Retreat,
        ];
        let record = apply_events(&mut session, &events).unwrap().unwrap();
        assert_eq!(record.get("email"), Some("a@b.com"));
        // Events after the accepted submit are not applied
        assert_eq!(session.current_step_index(), 1);
    }

    #[test]
    fn test_apply_rejected_submit_continues() {
        let mut session = newsletter();
        let events = vec![Event::Submit, Event::Advance];
        assert!(apply_events(&mut session, &events).unwrap().is_none());
        assert_eq!(session.current_step_index(), 0);
        assert_eq!(session.error("email"), Some("E-mail is required"));
    }

    #[test]
    fn test_apply_unknown_field() {
        let mut session = newsletter();
        let events = vec![Event::Update {
            field: "age".to_string(),
            value: "3".to_string(),
        }];
        assert!(matches!(
            apply_events(&mut session, &events),
            Err(WizardError::UnknownField { .. })
        ));
    }
}
