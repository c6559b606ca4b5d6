//! YAML error diagnostics for wizard definition files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error: {message}")]
#[diagnostic(code(stepform::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Create a syntax error from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert a 1-based line/column to a byte offset, clamped to the source
pub fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let content = text.trim_end_matches('\n');
            let within = content
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(i, _)| i)
                .unwrap_or(content.len());
            return line_start + within;
        }
        line_start += text.len();
    }
    source.len()
}

/// Suggest a fix for common mistakes in wizard definitions
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate key") {
        return Some("A key appears twice in the same step or field. Remove one of them.".to_string());
    }

    if msg_lower.contains("expected block end") || msg_lower.contains("did not find expected") {
        return Some(
            "Check indentation: fields belong under `fields:` and steps under `steps:`.".to_string(),
        );
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    if msg_lower.contains("unknown escape") || msg_lower.contains("found unknown escape character") {
        return Some(
            "Backslashes in double-quoted patterns must be doubled, or use single quotes: '\\d+'"
                .to_string(),
        );
    }

    if msg_lower.contains("flow") || msg_lower.contains("found unexpected ':'") {
        return Some(
            "Quote patterns that contain brackets, braces or colons: pattern: \"[0-9]*\"".to_string(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
        assert_eq!(line_col_to_offset(source, 9, 1), source.len());
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("found character that cannot start any token: tab").is_some());
        assert!(generate_help("duplicate key").is_some());
        assert!(generate_help("found unknown escape character").is_some());
        assert!(generate_help("some random error").is_none());
    }

    #[test]
    fn test_from_serde_error() {
        let source = "title: Broken\nsteps: [unclosed\n";
        let err = serde_yml::from_str::<serde_yml::Value>(source).unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, source, "broken.yaml");
        assert!(!diag.message().is_empty());
        assert!(diag.to_string().starts_with("YAML syntax error"));
    }
}
