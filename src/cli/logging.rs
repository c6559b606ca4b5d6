//! Logging initialization for the stepform binary
//!
//! Logs always go to stderr so that records written to stdout stay pipeable.

use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::Config;

/// Pick the filter directive: RUST_LOG wins, then the flags, then config
pub fn filter_directive(config: &Config, verbose: bool, quiet: bool) -> String {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        return directive;
    }
    if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        config.log_level()
    }
}

/// Install the global tracing subscriber
pub fn init_logging(config: &Config, verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::new(filter_directive(config, verbose, quiet));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .into_diagnostic()
}
