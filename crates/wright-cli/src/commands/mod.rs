//! CLI subcommand implementations.

pub mod deploy;
pub mod plan;
