//! Schema system - field declarations, validation rules and definition files

pub mod definition;
pub mod field;
pub mod registry;
pub mod validator;

pub use definition::{parse_definition, DefinitionChecker, DefinitionError, WizardDefinition};
pub use field::{ConfigError, FieldKind, FieldSpec, Pattern, StepSpec, WizardConfig};
pub use registry::WizardRegistry;
pub use validator::{validate, ErrorMap, FieldError, FormValues};
