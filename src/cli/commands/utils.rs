//! Wizard resolution shared by the commands

use miette::Result;
use std::path::Path;

use crate::core::Config;
use crate::schema::{DefinitionChecker, WizardConfig, WizardRegistry};

/// Whether a wizard argument names a file rather than a built-in
///
/// Bare names always refer to built-ins; use `./name` for a local file
/// without an extension.
pub fn is_path_like(arg: &str) -> bool {
    arg.ends_with(".yaml") || arg.ends_with(".yml") || Path::new(arg).components().count() > 1
}

/// Resolve a wizard argument (built-in name or file path) to a configuration
///
/// Falls back to the configured default wizard. Returns the display name
/// alongside the configuration.
pub fn load_wizard(arg: Option<&str>, config: &Config) -> Result<(String, WizardConfig)> {
    let name = arg
        .map(String::from)
        .unwrap_or_else(|| config.default_wizard());

    if is_path_like(&name) {
        let path = Path::new(&name);
        let wizard = DefinitionChecker::new()?.load_file(path)?;
        let display = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        tracing::debug!(path = %path.display(), "loaded wizard definition");
        Ok((display, wizard))
    } else {
        let wizard = WizardRegistry.load(&name)?;
        Ok((name, wizard))
    }
}

/// Raw YAML for a wizard argument, for `show --raw`
pub fn wizard_source(arg: Option<&str>, config: &Config) -> Result<String> {
    let name = arg
        .map(String::from)
        .unwrap_or_else(|| config.default_wizard());

    if is_path_like(&name) {
        std::fs::read_to_string(&name)
            .map_err(|e| miette::miette!("Failed to read {}: {}", name, e))
    } else {
        WizardRegistry
            .source(&name)
            .map(|source| source.into_owned())
            .ok_or_else(|| miette::miette!("Unknown wizard '{}'", name))
    }
}
