//! stepform: validated multi-step form wizards
//!
//! The library core is an in-memory state machine ([`core::WizardSession`])
//! over a declarative step/field schema ([`schema::WizardConfig`]). The
//! `stepform` binary is a terminal front end built on top of it.

pub mod cli;
pub mod core;
pub mod schema;
pub mod yaml;

pub use crate::core::{Record, Submission, WizardError, WizardSession};
pub use crate::schema::{FieldKind, FieldSpec, StepSpec, WizardConfig};
