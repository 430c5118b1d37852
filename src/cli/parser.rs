//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Logic64: architecture governance kernel for AI coding assistants.
///
/// Resolves coding intents against the project's architecture rules and
/// serves governance context to IDE agents over MCP.
#[derive(Parser, Debug)]
#[command(name = "logic64")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory governance documents are served from.
    ///
    /// Defaults to `./data`.
    #[arg(long, env = "LOGIC64_DOCS_ROOT", global = true)]
    pub docs_root: Option<PathBuf>,

    /// JSON rule table replacing the built-in rules.
    #[arg(long, env = "LOGIC64_RULES_PATH", global = true)]
    pub rules: Option<PathBuf>,

    /// Governance mode: strict (missing documents are fatal) or permissive.
    #[arg(long, env = "LOGIC64_GOVERNANCE_MODE", global = true)]
    pub governance_mode: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server.
    #[command(subcommand)]
    Serve(ServeCommands),

    /// Resolve an intent against the architecture rules.
    #[command(after_help = r#"Examples:
  logic64 resolve "build a database migration"     # Matched rules
  logic64 resolve "add an express server"          # Rejected
  logic64 --format json resolve "new card layout"
"#)]
    Resolve {
        /// Free-text description of the intended change.
        intent: String,
    },

    /// Check code for forbidden imports and styling patterns.
    ///
    /// Exits non-zero when violations are found.
    #[command(after_help = r#"Examples:
  logic64 verify src/app/page.tsx
  cat snippet.tsx | logic64 verify -
"#)]
    Verify {
        /// File to check, or `-` for stdin.
        file: PathBuf,
    },

    /// Report whether the required governance documents are present.
    Check,
}

/// MCP server subcommands.
#[derive(Subcommand, Debug)]
pub enum ServeCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  logic64 serve stdio
  LOGIC64_DOCS_ROOT=./data logic64 serve stdio
"#)]
    Stdio,

    /// Start MCP server with the SSE transport.
    ///
    /// Clients connect to `GET /sse` and post messages to
    /// `/messages?sessionId=<id>`.
    #[command(after_help = r#"Examples:
  logic64 serve sse                            # Listen on 127.0.0.1:3001
  logic64 serve sse --host 0.0.0.0 --port 8080
"#)]
    Sse {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "3001")]
        port: u16,
    },
}
