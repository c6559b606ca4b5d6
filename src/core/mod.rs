//! Core module - the wizard state machine and configuration

pub mod config;
pub mod session;

pub use config::Config;
pub use session::{
    Record, ReviewEntry, StepStatus, Submission, WizardError, WizardSession, MASKED, NOT_PROVIDED,
};
