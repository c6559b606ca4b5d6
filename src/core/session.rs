//! The wizard state machine
//!
//! A [`WizardSession`] owns its configuration, the flat value map and the
//! error map of the last validation pass. Navigation is strictly sequential:
//! forward motion is gated by validation of the current step, backward motion
//! never is. Submission is an action at the current step, not a state.
//!
//! Errors are cleared optimistically when a field is edited and only
//! re-computed on the next [`advance`](WizardSession::advance),
//! [`validate_current`](WizardSession::validate_current) or
//! [`submit`](WizardSession::submit).

use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::schema::field::{FieldKind, StepSpec, WizardConfig};
use crate::schema::validator::{validate, ErrorMap, FormValues};

/// Shown on the review step for fields left empty
pub const NOT_PROVIDED: &str = "Not provided";

/// Shown instead of secret values
pub const MASKED: &str = "********";

/// Integration faults raised by the session
#[derive(Debug, Error, Diagnostic)]
pub enum WizardError {
    #[error("Unknown field: '{name}'")]
    #[diagnostic(
        code(stepform::session::unknown_field),
        help("Only fields declared in the wizard definition can be updated")
    )]
    UnknownField { name: String },
}

/// Position of a step relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

/// The finalized record produced by a successful submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(FormValues);

impl Record {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_values(&self) -> &FormValues {
        &self.0
    }

    pub fn into_values(self) -> FormValues {
        self.0
    }
}

/// Outcome of [`WizardSession::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Submission {
    Accepted(Record),
    Rejected(ErrorMap),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }

    pub fn into_result(self) -> Result<Record, ErrorMap> {
        match self {
            Submission::Accepted(record) => Ok(record),
            Submission::Rejected(errors) => Err(errors),
        }
    }
}

/// One line of the review step
#[derive(Debug, Clone, Copy)]
pub struct ReviewEntry<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub kind: FieldKind,
    pub value: &'a str,
}

impl ReviewEntry<'_> {
    /// Value as shown to the user
    pub fn display_value(&self, mask_secrets: bool) -> Cow<'_, str> {
        if self.value.is_empty() {
            Cow::Borrowed(NOT_PROVIDED)
        } else if mask_secrets && self.kind.is_secret() {
            Cow::Borrowed(MASKED)
        } else {
            Cow::Borrowed(self.value)
        }
    }
}

/// Live state of one wizard run
#[derive(Debug, Clone)]
pub struct WizardSession {
    config: WizardConfig,
    current: usize,
    values: FormValues,
    errors: ErrorMap,
}

impl WizardSession {
    /// Start at the first step with every declared field set to `""`
    pub fn new(config: WizardConfig) -> Self {
        let values: FormValues = config
            .fields()
            .map(|field| (field.name.clone(), String::new()))
            .collect();

        debug!(
            steps = config.len(),
            fields = values.len(),
            "wizard session started"
        );

        Self {
            config,
            current: 0,
            values,
            errors: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn current_step_index(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &StepSpec {
        &self.config.steps()[self.current]
    }

    pub fn step_count(&self) -> usize {
        self.config.len()
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    /// True on the last step, where the primary action is submit
    pub fn is_review_step(&self) -> bool {
        self.current + 1 == self.config.len()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Set a field's value and drop its pending error
    pub fn update_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), WizardError> {
        let Some(slot) = self.values.get_mut(name) else {
            return Err(WizardError::UnknownField {
                name: name.to_string(),
            });
        };
        *slot = value.into();
        if self.errors.shift_remove(name).is_some() {
            trace!(field = name, "error cleared on edit");
        }
        Ok(())
    }

    /// Validate the current step, replacing the error map
    pub fn validate_current(&mut self) -> bool {
        self.errors = validate(self.current_step(), &self.values);
        if !self.errors.is_empty() {
            debug!(
                step = self.current,
                failing = self.errors.len(),
                "step validation failed"
            );
        }
        self.errors.is_empty()
    }

    /// Move forward one step if the current step validates
    ///
    /// Returns whether the gate passed. On the last step a passing gate
    /// leaves the index where it is.
    pub fn advance(&mut self) -> bool {
        if !self.validate_current() {
            return false;
        }
        let last = self.config.len() - 1;
        if self.current < last {
            self.current += 1;
            debug!(step = self.current, "advanced");
        }
        true
    }

    /// Move back one step without validating; errors are left untouched
    ///
    /// Returns whether the index changed.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        debug!(step = self.current, "retreated");
        true
    }

    /// Validate the current step and hand out the full record if it passes
    pub fn submit(&mut self) -> Submission {
        if self.validate_current() {
            info!(step = self.current, fields = self.values.len(), "wizard submitted");
            Submission::Accepted(Record(self.values.clone()))
        } else {
            Submission::Rejected(self.errors.clone())
        }
    }

    /// Fraction of steps reached, `(index + 1) / N`
    pub fn progress(&self) -> f64 {
        (self.current + 1) as f64 / self.config.len() as f64
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress() * 100.0
    }

    /// Status of step `index` for a step indicator
    pub fn step_status(&self, index: usize) -> StepStatus {
        use std::cmp::Ordering;

        match index.cmp(&self.current) {
            Ordering::Less => StepStatus::Completed,
            Ordering::Equal => StepStatus::Active,
            Ordering::Greater => StepStatus::Upcoming,
        }
    }

    /// Every declared field with its current value, in declaration order
    pub fn review(&self) -> Vec<ReviewEntry<'_>> {
        self.config
            .fields()
            .map(|field| ReviewEntry {
                name: &field.name,
                label: &field.label,
                kind: field.kind,
                value: self.value(&field.name).unwrap_or(""),
            })
            .collect()
    }
}
