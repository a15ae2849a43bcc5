//! CLI layer for insight-agent.
//!
//! Provides the command-line interface using clap, with commands for
//! running an analysis, answering or titling a conversation directly,
//! and scaffolding prompt templates.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
