//! Per-step field validation
//!
//! Each field gets at most one error. Rules are checked in a fixed order and
//! the first failing rule wins: required, then pattern, then the kind-specific
//! shape check.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::schema::field::{FieldKind, FieldSpec, StepSpec};

/// Field name to current value, in declaration order
pub type FormValues = IndexMap<String, String>;

/// Field name to error message, for the fields that failed
pub type ErrorMap = IndexMap<String, String>;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape regex is valid")
});

/// Why a single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{label} is required")]
    Required { label: String },

    #[error("Invalid format for {label}")]
    Format { label: String },

    #[error("Please enter a valid email address")]
    Email,
}

/// Check one value against its field's rules
pub fn check_field(field: &FieldSpec, value: &str) -> Option<FieldError> {
    if field.required && value.trim().is_empty() {
        return Some(FieldError::Required {
            label: field.label.clone(),
        });
    }
    if value.is_empty() {
        return None;
    }
    if let Some(pattern) = &field.pattern {
        if !pattern.is_match(value) {
            return Some(FieldError::Format {
                label: field.label.clone(),
            });
        }
        // A pattern takes the place of the kind check
        return None;
    }
    check_kind(field.kind, value)
}

fn check_kind(kind: FieldKind, value: &str) -> Option<FieldError> {
    match kind {
        FieldKind::Email => (!is_email(value)).then_some(FieldError::Email),
        FieldKind::Text | FieldKind::Tel | FieldKind::Numeric | FieldKind::Secret => None,
    }
}

/// `local@domain.tld` with no whitespace anywhere
pub fn is_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// Validate the fields of `step` against `values`
///
/// Names missing from `values` are treated as empty. A step without fields
/// always yields an empty map.
pub fn validate(step: &StepSpec, values: &FormValues) -> ErrorMap {
    step.fields
        .iter()
        .filter_map(|field| {
            let value = values.get(&field.name).map(String::as_str).unwrap_or("");
            check_field(field, value).map(|err| (field.name.clone(), err.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn birthday_step() -> StepSpec {
        StepSpec::new("Birthday").field(
            FieldSpec::new("dd", "DD")
                .required()
                .max_length(NonZeroUsize::new(2).unwrap())
                .pattern("[0-9]*")
                .unwrap(),
        )
    }

    #[test]
    fn test_required_field_blank() {
        let step = StepSpec::new("Name").field(FieldSpec::new("fname", "First name").required());
        let errors = validate(&step, &values(&[("fname", "   ")]));
        assert_eq!(errors.get("fname").unwrap(), "First name is required");
    }

    #[test]
    fn test_missing_value_counts_as_empty() {
        let step = StepSpec::new("Name").field(FieldSpec::new("fname", "First name").required());
        let errors = validate(&step, &FormValues::new());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_optional_empty_field_passes() {
        let step = StepSpec::new("Contact").field(FieldSpec::new("email", "E-mail").kind(FieldKind::Email));
        assert!(validate(&step, &values(&[("email", "")])).is_empty());
    }

    #[test]
    fn test_pattern_mismatch() {
        let errors = validate(&birthday_step(), &values(&[("dd", "ab")]));
        assert_eq!(errors.get("dd").unwrap(), "Invalid format for DD");

        let errors = validate(&birthday_step(), &values(&[("dd", "12")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_shape() {
        let step = StepSpec::new("Contact")
            .field(FieldSpec::new("email", "E-mail").kind(FieldKind::Email).required());

        for bad in ["bad", "a@b", "a b@c.com", "@b.com", "a@@b.com"] {
            let errors = validate(&step, &values(&[("email", bad)]));
            assert_eq!(
                errors.get("email").map(String::as_str),
                Some("Please enter a valid email address"),
                "{bad} should be rejected"
            );
        }
        assert!(validate(&step, &values(&[("email", "a@b.com")])).is_empty());
    }

    #[test]
    fn test_pattern_wins_over_email_check() {
        let step = StepSpec::new("Contact").field(
            FieldSpec::new("email", "Work e-mail")
                .kind(FieldKind::Email)
                .pattern(".*@corp")
                .unwrap(),
        );

        let errors = validate(&step, &values(&[("email", "someone@else.com")]));
        assert_eq!(errors.get("email").unwrap(), "Invalid format for Work e-mail");

        // Matches the pattern but not the email shape: pattern rule replaces it
        assert!(validate(&step, &values(&[("email", "me@corp")])).is_empty());
    }

    #[test]
    fn test_required_wins_over_pattern() {
        let errors = validate(&birthday_step(), &values(&[("dd", "")]));
        assert_eq!(errors.get("dd").unwrap(), "DD is required");
    }

    #[test]
    fn test_review_step_always_valid() {
        let step = StepSpec::new("Preview & Submit");
        assert!(validate(&step, &values(&[("fname", "")])).is_empty());
    }

    #[test]
    fn test_only_step_fields_are_checked() {
        let step = StepSpec::new("Name").field(FieldSpec::new("fname", "First name").required());
        let errors = validate(&step, &values(&[("fname", "Ada"), ("email", "bad")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let step = StepSpec::new("Name")
            .field(FieldSpec::new("lname", "Last name").required())
            .field(FieldSpec::new("fname", "First name").required());
        let errors = validate(&step, &FormValues::new());
        let keys: Vec<_> = errors.keys().map(String::as_str).collect();
        assert_eq!(keys, ["lname", "fname"]);
    }
}
