//! CLI command implementations

pub mod utils;

pub mod check;
pub mod completions;
pub mod list;
pub mod replay;
pub mod run;
pub mod show;
