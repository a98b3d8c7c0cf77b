//! CLI command handlers

pub mod agents;
pub mod completions;
pub mod generate;
pub mod validate;
