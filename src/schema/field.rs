//! Field and step declarations
//!
//! A wizard is an ordered list of steps, each holding zero or more fields.
//! Field names form one flat namespace across the whole wizard, so the
//! uniqueness check happens once when the [`WizardConfig`] is built.

use miette::Diagnostic;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use thiserror::Error;

/// Errors raised while assembling a wizard configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Wizard has no steps")]
    #[diagnostic(
        code(stepform::config::no_steps),
        help("Add at least one step; the last step is usually a field-less review step")
    )]
    NoSteps,

    #[error("Field in step {} has an empty name", .step + 1)]
    #[diagnostic(code(stepform::config::empty_name))]
    EmptyName { step: usize },

    #[error(
        "Duplicate field '{name}' (declared in step {} and step {})",
        .first_step + 1,
        .second_step + 1
    )]
    #[diagnostic(
        code(stepform::config::duplicate_field),
        help("Field names share one namespace across all steps; rename one of them")
    )]
    DuplicateField {
        name: String,
        first_step: usize,
        second_step: usize,
    },

    #[error("Invalid pattern for field '{field}': {pattern}")]
    #[diagnostic(code(stepform::config::invalid_pattern))]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Field '{field}' has max_length 0")]
    #[diagnostic(
        code(stepform::config::zero_max_length),
        help("Remove max_length or set it to a positive number")
    )]
    ZeroMaxLength { field: String },
}

/// Input kind of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Tel,
    Numeric,
    Secret,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Tel => "tel",
            FieldKind::Numeric => "numeric",
            FieldKind::Secret => "secret",
        }
    }

    /// Whether values of this kind should be hidden when displayed
    pub fn is_secret(&self) -> bool {
        matches!(self, FieldKind::Secret)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled value pattern
///
/// The whole value has to match, the same way an HTML `pattern` attribute
/// behaves: `[0-9]*` accepts `"12"` and rejects `"ab"`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One input of a step
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub pattern: Option<Pattern>,
    pub max_length: Option<NonZeroUsize>,
}

impl FieldSpec {
    /// Create an optional text field
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            placeholder: None,
            kind: FieldKind::Text,
            required: false,
            pattern: None,
            max_length: None,
        }
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn max_length(mut self, max_length: NonZeroUsize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Attach a pattern, compiling it up front; an empty pattern means none
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        if pattern.is_empty() {
            self.pattern = None;
            return Ok(self);
        }
        let compiled = Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            field: self.name.clone(),
            pattern: pattern.to_string(),
            source,
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// Whether `value` fits the input length limit (counted in characters)
    pub fn accepts_length(&self, value: &str) -> bool {
        match self.max_length {
            Some(limit) => value.chars().count() <= limit.get(),
            None => true,
        }
    }
}

/// An ordered group of fields shown together
#[derive(Debug, Clone)]
pub struct StepSpec {
    pub title: String,
    pub icon: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            icon: None,
            fields: Vec::new(),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// A step without fields only presents the collected record
    pub fn is_review(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A validated, ordered sequence of steps
#[derive(Debug, Clone)]
pub struct WizardConfig {
    title: Option<String>,
    description: Option<String>,
    steps: Vec<StepSpec>,
}

impl WizardConfig {
    /// Build a configuration, checking that there is at least one step and
    /// that every field name is non-empty and unique across all steps
    pub fn new(steps: Vec<StepSpec>) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (step_index, step) in steps.iter().enumerate() {
            for field in &step.fields {
                if field.name.trim().is_empty() {
                    return Err(ConfigError::EmptyName { step: step_index });
                }
                if let Some(first_step) = seen.insert(field.name.as_str(), step_index) {
                    return Err(ConfigError::DuplicateField {
                        name: field.name.clone(),
                        first_step,
                        second_step: step_index,
                    });
                }
            }
        }

        Ok(Self {
            title: None,
            description: None,
            steps,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    /// Number of steps (always at least one)
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All fields in declaration order, across steps
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_digits() -> NonZeroUsize {
        NonZeroUsize::new(2).unwrap()
    }

    #[test]
    fn test_pattern_matches_whole_value() {
        let pattern = Pattern::new("[0-9]*").unwrap();
        assert!(pattern.is_match("12"));
        assert!(pattern.is_match(""));
        assert!(!pattern.is_match("ab"));
        assert!(!pattern.is_match("1a"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = FieldSpec::new("dd", "DD").pattern("[0-9").unwrap_err();
        match err {
            ConfigError::InvalidPattern { field, pattern, .. } => {
                assert_eq!(field, "dd");
                assert_eq!(pattern, "[0-9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_pattern_means_none() {
        let field = FieldSpec::new("code", "Code").pattern("").unwrap();
        assert!(field.pattern.is_none());
    }

    #[test]
    fn test_accepts_length_counts_chars() {
        let field = FieldSpec::new("dd", "DD").max_length(two_digits());
        assert!(field.accepts_length("12"));
        assert!(!field.accepts_length("123"));
        assert!(field.accepts_length("éé"));

        let unlimited = FieldSpec::new("bio", "Bio");
        assert!(unlimited.accepts_length(&"x".repeat(1000)));
    }

    #[test]
    fn test_config_requires_a_step() {
        assert!(matches!(WizardConfig::new(vec![]), Err(ConfigError::NoSteps)));
    }

    #[test]
    fn test_duplicate_names_across_steps() {
        let steps = vec![
            StepSpec::new("One").field(FieldSpec::new("email", "E-mail")),
            StepSpec::new("Two").field(FieldSpec::new("email", "E-mail again")),
        ];
        match WizardConfig::new(steps) {
            Err(ConfigError::DuplicateField {
                name,
                first_step,
                second_step,
            }) => {
                assert_eq!(name, "email");
                assert_eq!(first_step, 0);
                assert_eq!(second_step, 1);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_names_within_step() {
        let steps = vec![StepSpec::new("One")
            .field(FieldSpec::new("a", "A"))
            .field(FieldSpec::new("a", "A"))];
        let err = WizardConfig::new(steps).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate field 'a' (declared in step 1 and step 1)"
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let steps = vec![
            StepSpec::new("Review"),
            StepSpec::new("Two").field(FieldSpec::new("  ", "Blank")),
        ];
        assert!(matches!(
            WizardConfig::new(steps),
            Err(ConfigError::EmptyName { step: 1 })
        ));
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let config = WizardConfig::new(vec![
            StepSpec::new("One")
                .field(FieldSpec::new("b", "B"))
                .field(FieldSpec::new("a", "A")),
            StepSpec::new("Two").field(FieldSpec::new("c", "C")),
            StepSpec::new("Review"),
        ])
        .unwrap();

        let names: Vec<_> = config.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert!(config.has_field("c"));
        assert!(!config.has_field("d"));
        assert!(config.step(2).unwrap().is_review());
        assert_eq!(config.len(), 3);
    }
}
