//! YAML helpers - syntax diagnostics

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;
