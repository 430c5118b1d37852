//! CLI layer for logic64.
//!
//! Provides the command-line interface using clap, with commands for
//! serving the MCP kernel and for checking intents and code locally.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands, ServeCommands};
