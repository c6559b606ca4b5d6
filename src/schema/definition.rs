//! Wizard definition files: YAML parsing, schema checks and diagnostics
//!
//! A definition goes through three gates before it becomes a
//! [`WizardConfig`]: YAML syntax, the embedded JSON Schema, and the
//! construction checks of [`WizardConfig::new`]. Each failure is reported as
//! a miette diagnostic pointing back into the YAML source.

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::field::{ConfigError, FieldKind, FieldSpec, StepSpec, WizardConfig};
use crate::yaml::diagnostics::YamlSyntaxError;

/// JSON Schema for definition files
pub const WIZARD_SCHEMA: &str = include_str!("../../schemas/wizard.schema.json");

/// Serialized form of a wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl WizardDefinition {
    /// Compile patterns and run the construction checks
    pub fn into_config(self) -> Result<WizardConfig, ConfigError> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for step in self.steps {
            let mut spec = StepSpec::new(step.title);
            spec.icon = step.icon;
            for field in step.fields {
                spec.fields.push(field.into_spec()?);
            }
            steps.push(spec);
        }

        let mut config = WizardConfig::new(steps)?;
        if let Some(title) = self.title {
            config = config.with_title(title);
        }
        if let Some(description) = self.description {
            config = config.with_description(description);
        }
        Ok(config)
    }
}

impl FieldDefinition {
    fn into_spec(self) -> Result<FieldSpec, ConfigError> {
        let max_length = match self.max_length {
            Some(0) => return Err(ConfigError::ZeroMaxLength { field: self.name }),
            other => other.and_then(NonZeroUsize::new),
        };

        let mut spec = FieldSpec::new(self.name, self.label).kind(self.kind);
        spec.required = self.required;
        spec.placeholder = self.placeholder;
        spec.max_length = max_length;
        match self.pattern {
            Some(pattern) => spec.pattern(&pattern),
            None => Ok(spec),
        }
    }
}

impl From<&WizardConfig> for WizardDefinition {
    fn from(config: &WizardConfig) -> Self {
        Self {
            title: config.title().map(String::from),
            description: config.description().map(String::from),
            steps: config
                .steps()
                .iter()
                .map(|step| StepDefinition {
                    title: step.title.clone(),
                    icon: step.icon.clone(),
                    fields: step
                        .fields
                        .iter()
                        .map(|field| FieldDefinition {
                            name: field.name.clone(),
                            label: field.label.clone(),
                            placeholder: field.placeholder.clone(),
                            kind: field.kind,
                            required: field.required,
                            pattern: field.pattern.as_ref().map(|p| p.as_str().to_string()),
                            max_length: field.max_length.map(NonZeroUsize::get),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Schema check failure with every violation found
#[derive(Debug, Error, Diagnostic)]
#[error("Wizard definition does not match the schema: {summary}")]
#[diagnostic(code(stepform::definition::schema))]
pub struct SchemaError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl SchemaError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Anything that can go wrong turning a file or name into a [`WizardConfig`]
#[derive(Debug, Error, Diagnostic)]
pub enum DefinitionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid wizard definition: {source}")]
    #[diagnostic(code(stepform::definition::invalid))]
    Invalid {
        #[source_code]
        src: NamedSource<String>,

        #[label("declared here")]
        span: SourceSpan,

        #[source]
        #[diagnostic_source]
        source: ConfigError,
    },

    #[error("Malformed wizard definition: {0}")]
    #[diagnostic(code(stepform::definition::malformed))]
    Malformed(String),

    #[error("Embedded wizard schema failed to compile: {0}")]
    #[diagnostic(code(stepform::definition::schema_compile))]
    SchemaCompile(String),

    #[error("Failed to read {}", .path.display())]
    #[diagnostic(code(stepform::definition::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown wizard '{name}'")]
    #[diagnostic(
        code(stepform::definition::unknown_wizard),
        help("Built-in wizards: {available}. Pass a path to load a definition file.")
    )]
    UnknownWizard { name: String, available: String },
}

/// Checks definition documents against the embedded schema
pub struct DefinitionChecker {
    compiled: JsonValidator,
}

impl DefinitionChecker {
    pub fn new() -> Result<Self, DefinitionError> {
        let schema: JsonValue = serde_json::from_str(WIZARD_SCHEMA)
            .map_err(|e| DefinitionError::SchemaCompile(e.to_string()))?;
        let compiled =
            validator_for(&schema).map_err(|e| DefinitionError::SchemaCompile(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Parse YAML and collect every schema violation
    pub fn check(&self, content: &str, filename: &str) -> Result<JsonValue, DefinitionError> {
        let yaml_value: serde_yml::Value = serde_yml::from_str(content)
            .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename))?;

        let json_value: JsonValue = serde_json::to_value(&yaml_value)
            .map_err(|e| DefinitionError::Malformed(format!("cannot convert YAML to JSON: {}", e)))?;

        let violations: Vec<SchemaViolation> = self
            .compiled
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(json_value)
        } else {
            Err(SchemaError::new(filename, content, violations).into())
        }
    }

    /// Parse, check and build a wizard configuration
    pub fn load(&self, content: &str, filename: &str) -> Result<WizardConfig, DefinitionError> {
        let json_value = self.check(content, filename)?;
        let definition: WizardDefinition = serde_json::from_value(json_value)
            .map_err(|e| DefinitionError::Malformed(e.to_string()))?;

        definition
            .into_config()
            .map_err(|source| DefinitionError::Invalid {
                src: NamedSource::new(filename, content.to_string()),
                span: config_error_span(content, &source),
                source,
            })
    }

    pub fn load_file(&self, path: &Path) -> Result<WizardConfig, DefinitionError> {
        let content = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path.display().to_string();
        self.load(&content, &filename)
    }
}

/// Parse a definition document into a configuration
pub fn parse_definition(content: &str, filename: &str) -> Result<WizardConfig, DefinitionError> {
    DefinitionChecker::new()?.load(content, filename)
}

fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);
    let span = find_path_span(content, &path);

    SchemaViolation::new(message, hint, span, help)
}

/// Render a JSON pointer like `/steps/1/fields/0` as `step 2 › field 1`
fn describe_path(json_path: &str) -> String {
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return "document root".to_string();
    }

    let mut described = Vec::new();
    let mut iter = parts.iter().peekable();
    while let Some(part) = iter.next() {
        let index = iter.peek().and_then(|next| next.parse::<usize>().ok());
        match (*part, index) {
            ("steps", Some(i)) => {
                described.push(format!("step {}", i + 1));
                iter.next();
            }
            ("fields", Some(i)) => {
                described.push(format!("field {}", i + 1));
                iter.next();
            }
            (other, _) => described.push(other.to_string()),
        }
    }
    described.join(" › ")
}

fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = describe_path(error.instance_path.as_str());

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required key '{}' at {}", prop_str, path)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            format!(
                "Invalid value at {}: must be one of: {}",
                path,
                format_enum_options(options)
            )
        }
        jsonschema::error::ValidationErrorKind::MinItems { .. } => {
            format!("{} must not be empty", path)
        }
        jsonschema::error::ValidationErrorKind::MinLength { .. } => {
            format!("Value at {} must not be empty", path)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown key(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { .. } => "required key missing",
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type",
        jsonschema::error::ValidationErrorKind::Enum { .. } => "invalid value",
        jsonschema::error::ValidationErrorKind::MinItems { .. } => "empty list",
        jsonschema::error::ValidationErrorKind::MinLength { .. } => "empty value",
        jsonschema::error::ValidationErrorKind::AdditionalProperties { .. } => "unknown key",
        _ => "schema violation",
    }
    .to_string()
}

fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            match property.as_str() {
                Some("label") => Some("Every field needs a label; error messages are built from it".to_string()),
                Some("steps") => Some("A wizard is a list of steps under `steps:`".to_string()),
                Some(other) => Some(format!("Add the '{}' key", other)),
                None => None,
            }
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        jsonschema::error::ValidationErrorKind::MinItems { .. } => {
            Some("Add at least one step; the last one is usually a field-less review step".to_string())
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.iter().any(|key| key == "maxLength") {
                Some("Use snake_case keys: max_length".to_string())
            } else if unexpected.len() == 1 {
                Some(format!("Remove the '{}' key or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown keys or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Byte offset and text of every line
fn index_lines(content: &str) -> Vec<(usize, &str)> {
    let mut offset = 0;
    content
        .split_inclusive('\n')
        .map(|raw| {
            let start = offset;
            offset += raw.len();
            (start, raw.trim_end_matches(['\n', '\r']))
        })
        .collect()
}

fn line_span((offset, line): (usize, &str)) -> SourceSpan {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();
    (offset + indent, trimmed.len().max(1)).into()
}

fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

fn is_list_item(trimmed: &str) -> bool {
    trimmed == "-" || trimmed.starts_with("- ")
}

fn has_key(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    let body = trimmed.strip_prefix("- ").unwrap_or(trimmed).trim_start();
    body.starts_with(&format!("{}:", key))
        || line.contains(&format!("{{ {}:", key))
        || line.contains(&format!("{{{}:", key))
        || line.contains(&format!(", {}:", key))
}

fn find_key(lines: &[(usize, &str)], from: usize, key: &str) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, (_, line))| has_key(line, key))
        .map(|(i, _)| i)
}

/// Find the `index`-th block list item after line `from`
fn find_list_item(lines: &[(usize, &str)], from: usize, index: usize) -> Option<usize> {
    let mut item_indent = None;
    let mut seen = 0;

    for (i, (_, line)) in lines.iter().enumerate().skip(from + 1) {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();
        match item_indent {
            None if is_list_item(trimmed) => item_indent = Some(indent),
            None => continue,
            Some(expected) if indent < expected => return None,
            Some(expected) if indent > expected || !is_list_item(trimmed) => continue,
            Some(_) => {}
        }
        if seen == index {
            return Some(i);
        }
        seen += 1;
    }
    None
}

/// Find the span for a JSON pointer in YAML content
///
/// Walks the pointer one segment at a time so `/steps/1/fields/0/kind`
/// lands on the `kind:` line of the right field. Falls back to the deepest
/// segment found, then to the first line.
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    let lines = index_lines(content);
    let mut cursor = 0;
    let mut found = None;

    for segment in json_path.split('/').filter(|s| !s.is_empty()) {
        let next = match segment.parse::<usize>() {
            Ok(index) => find_list_item(&lines, cursor, index),
            Err(_) => find_key(&lines, cursor, segment),
        };
        match next {
            Some(line) => {
                cursor = line;
                found = Some(line);
            }
            None => break,
        }
    }

    match found {
        Some(line) => line_span(lines[line]),
        None => first_line_span(content),
    }
}

/// Line of the `step`-th item under `steps:`
fn find_step_line(lines: &[(usize, &str)], step: usize) -> Option<usize> {
    find_key(lines, 0, "steps").and_then(|l| find_list_item(lines, l, step))
}

/// Find the first line at or after `start` declaring field `name`
fn find_field_line(lines: &[(usize, &str)], start: usize, name: &str) -> Option<usize> {
    let candidates = [
        format!("name: {}", name),
        format!("name: \"{}\"", name),
        format!("name: '{}'", name),
    ];

    lines
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, (_, line))| {
            candidates.iter().any(|c| {
                line.find(c.as_str()).is_some_and(|at| {
                    let rest = &line[at + c.len()..];
                    rest.is_empty() || rest.starts_with([',', ' ', '}'])
                })
            })
        })
        .map(|(i, _)| i)
}

fn config_error_span(content: &str, error: &ConfigError) -> SourceSpan {
    let lines = index_lines(content);
    let located = match error {
        ConfigError::NoSteps => find_key(&lines, 0, "steps"),
        ConfigError::EmptyName { step } => find_step_line(&lines, *step),
        ConfigError::DuplicateField {
            name,
            first_step,
            second_step,
        } => {
            let declared = find_step_line(&lines, *second_step)
                .and_then(|start| find_field_line(&lines, start, name));
            if first_step == second_step {
                // Both declarations sit in one step; point at the later one
                declared.map(|first| find_field_line(&lines, first + 1, name).unwrap_or(first))
            } else {
                declared
            }
        }
        ConfigError::InvalidPattern { field, .. } => find_field_line(&lines, 0, field)
            .map(|l| find_key(&lines, l, "pattern").unwrap_or(l)),
        ConfigError::ZeroMaxLength { field } => find_field_line(&lines, 0, field)
            .map(|l| find_key(&lines, l, "max_length").unwrap_or(l)),
    };

    match located {
        Some(line) => line_span(lines[line]),
        None => first_line_span(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNUP: &str = r#"title: Sign up
steps:
  - title: Name
    icon: "👤"
    fields:
      - name: fname
        label: First name
        required: true
  - title: Contact
    fields:
      - name: email
        label: E-mail
        kind: email
      - { name: phone, label: Phone, kind: tel }
  - title: Review
"#;

    fn checker() -> DefinitionChecker {
        DefinitionChecker::new().unwrap()
    }

    fn line_at(content: &str, span: SourceSpan) -> &str {
        let start = span.offset();
        let end = content[start..].find('\n').map(|e| start + e).unwrap_or(content.len());
        &content[start..end]
    }

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(DefinitionChecker::new().is_ok());
    }

    #[test]
    fn test_load_valid_definition() {
        let config = checker().load(SIGNUP, "signup.yaml").unwrap();
        assert_eq!(config.title(), Some("Sign up"));
        assert_eq!(config.len(), 3);
        assert_eq!(config.step(0).unwrap().icon.as_deref(), Some("👤"));
        let phone = config.field("phone").unwrap();
        assert_eq!(phone.kind, FieldKind::Tel);
        assert!(!phone.required);
        assert!(config.step(2).unwrap().is_review());
    }

    #[test]
    fn test_yaml_syntax_error() {
        let result = parse_definition("steps: [unclosed\n", "broken.yaml");
        assert!(matches!(result, Err(DefinitionError::Syntax(_))));
    }

    #[test]
    fn test_missing_label_is_schema_error() {
        let yaml = "steps:\n  - title: One\n    fields:\n      - name: fname\n";
        match checker().load(yaml, "nolabel.yaml") {
            Err(DefinitionError::Schema(err)) => {
                assert_eq!(err.violations().len(), 1);
                assert!(err.violations()[0].message().contains("label"));
                assert!(err.violations()[0].message().contains("step 1 › field 1"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_schema_error() {
        let yaml = "steps:\n  - title: One\n    fields:\n      - name: n\n        label: N\n        kind: date\n";
        let result = checker().load(yaml, "kind.yaml");
        assert!(matches!(result, Err(DefinitionError::Schema(_))));
    }

    #[test]
    fn test_camel_case_key_rejected() {
        let yaml = "steps:\n  - title: One\n    fields:\n      - name: n\n        label: N\n        maxLength: 2\n";
        match checker().load(yaml, "camel.yaml") {
            Err(DefinitionError::Schema(err)) => {
                assert!(err.violations()[0].message().contains("maxLength"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_steps_rejected() {
        let result = checker().load("steps: []\n", "empty.yaml");
        assert!(matches!(result, Err(DefinitionError::Schema(_))));
    }

    #[test]
    fn test_duplicate_field_points_at_second_declaration() {
        let yaml = "steps:\n  - title: One\n    fields:\n      - name: email\n        label: E-mail\n  - title: Two\n    fields:\n      - name: email\n        label: Again\n";
        match checker().load(yaml, "dup.yaml") {
            Err(DefinitionError::Invalid { span, source, .. }) => {
                assert!(matches!(source, ConfigError::DuplicateField { .. }));
                assert!(span.offset() > yaml.find("title: Two").unwrap());
                assert_eq!(line_at(yaml, span), "- name: email");
            }
            other => panic!("expected invalid definition, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_pattern_and_zero_length() {
        let yaml = "steps:\n  - title: One\n    fields:\n      - name: dd\n        label: DD\n        pattern: \"[0-9\"\n";
        match checker().load(yaml, "pattern.yaml") {
            Err(DefinitionError::Invalid { span, source, .. }) => {
                assert!(matches!(source, ConfigError::InvalidPattern { .. }));
                assert!(line_at(yaml, span).starts_with("pattern:"));
            }
            other => panic!("expected invalid pattern, got {other:?}"),
        }

        let yaml = "steps:\n  - title: One\n    fields:\n      - name: dd\n        label: DD\n        max_length: 0\n";
        assert!(matches!(
            checker().load(yaml, "zero.yaml"),
            Err(DefinitionError::Invalid {
                source: ConfigError::ZeroMaxLength { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_find_path_span_walks_segments() {
        let span = find_path_span(SIGNUP, "/steps/1/fields/0/kind");
        assert_eq!(line_at(SIGNUP, span), "kind: email");

        let span = find_path_span(SIGNUP, "/steps/1/fields/1");
        assert!(line_at(SIGNUP, span).contains("name: phone"));

        let span = find_path_span(SIGNUP, "/steps/2");
        assert_eq!(line_at(SIGNUP, span), "- title: Review");

        let span = find_path_span(SIGNUP, "");
        assert_eq!(span.offset(), 0);
    }

    #[test]
    fn test_describe_path() {
        assert_eq!(describe_path(""), "document root");
        assert_eq!(describe_path("/steps/0/fields/2/kind"), "step 1 › field 3 › kind");
        assert_eq!(describe_path("/title"), "title");
    }

    #[test]
    fn test_definition_round_trip_through_config() {
        let config = checker().load(SIGNUP, "signup.yaml").unwrap();
        let definition = WizardDefinition::from(&config);
        let yaml = serde_yml::to_string(&definition).unwrap();
        let reloaded = checker().load(&yaml, "again.yaml").unwrap();
        let names: Vec<_> = reloaded.fields().map(|f| f.name.clone()).collect();
        assert_eq!(names, ["fname", "email", "phone"]);
    }
}
