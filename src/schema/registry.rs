//! Built-in wizard definitions embedded at compile time

use rust_embed::Embed;
use std::borrow::Cow;

use crate::schema::definition::{DefinitionChecker, DefinitionError};
use crate::schema::field::WizardConfig;

#[derive(Embed)]
#[folder = "wizards/"]
struct EmbeddedWizards;

/// Lookup of the wizards shipped with the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct WizardRegistry;

impl WizardRegistry {
    /// Name of the wizard used when none is configured
    pub const DEFAULT: &'static str = "registration";

    /// Names of all built-in wizards, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = EmbeddedWizards::iter()
            .filter_map(|file| file.strip_suffix(".yaml").map(String::from))
            .collect();
        names.sort();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        EmbeddedWizards::get(&format!("{}.yaml", name)).is_some()
    }

    /// Raw YAML of a built-in wizard
    pub fn source(&self, name: &str) -> Option<Cow<'static, str>> {
        let file = EmbeddedWizards::get(&format!("{}.yaml", name))?;
        match file.data {
            Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
        }
    }

    /// Parse a built-in wizard into a configuration
    pub fn load(&self, name: &str) -> Result<WizardConfig, DefinitionError> {
        let source = self
            .source(name)
            .ok_or_else(|| DefinitionError::UnknownWizard {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
        DefinitionChecker::new()?.load(&source, &format!("{}.yaml", name))
    }
}
