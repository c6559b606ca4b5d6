//! Rendering of session state and submitted records

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;
use crate::core::{Record, WizardSession};
use crate::schema::ErrorMap;

/// Snapshot of a session as printed by `run` and `replay`
#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub wizard: &'a str,
    /// 1-based step number
    pub step: usize,
    pub step_title: &'a str,
    pub steps: usize,
    pub progress_percent: f64,
    pub errors: &'a ErrorMap,
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<&'a Record>,

    #[serde(skip)]
    session: &'a WizardSession,
}

impl<'a> SessionReport<'a> {
    pub fn new(wizard: &'a str, session: &'a WizardSession, record: Option<&'a Record>) -> Self {
        Self {
            wizard,
            step: session.current_step_index() + 1,
            step_title: &session.current_step().title,
            steps: session.step_count(),
            progress_percent: session.progress_percent().round(),
            errors: session.errors(),
            submitted: record.is_some(),
            submitted_at: record.map(|_| Utc::now()),
            record,
            session,
        }
    }

    /// Render in the given format (`Auto` means YAML)
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Auto | OutputFormat::Yaml => serde_yml::to_string(self).into_diagnostic(),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(self).into_diagnostic()?;
                json.push('\n');
                Ok(json)
            }
            OutputFormat::Csv => Ok(self.render_csv()),
        }
    }

    /// One row per declared field: name, value, pending error
    fn render_csv(&self) -> String {
        let mut out = String::from("field,value,error\n");
        for (name, value) in self.session.values() {
            let error = self.errors.get(name).map(String::as_str).unwrap_or("");
            out.push_str(&format!(
                "{},{},{}\n",
                escape_csv(name),
                escape_csv(value),
                escape_csv(error)
            ));
        }
        out
    }
}

/// Write to a file, or stdout when no path is given
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content).into_diagnostic(),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
