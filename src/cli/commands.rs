//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::output::{OutputFormat, format_check, format_report, format_resolution};
use crate::cli::parser::{Cli, Commands, ServeCommands};
use crate::config::{GovernanceMode, ServerConfig};
use crate::docs::DocumentStore;
use crate::error::{CommandError, Result};
use crate::governance::{RuleTable, resolve, verify};
use crate::mcp::{Logic64Server, serve_sse, serve_stdio};

/// Executes the parsed command and returns its output.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub fn execute(cli: &Cli) -> Result<String> {
    let config = build_config(cli)?;
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Serve(cmd) => cmd_serve(cmd, config),
        Commands::Resolve { intent } => cmd_resolve(intent, &config, format),
        Commands::Verify { file } => cmd_verify(file, &config, format),
        Commands::Check => cmd_check(&config, format),
    }
}

/// Merges CLI flags over environment variables and defaults.
fn build_config(cli: &Cli) -> Result<ServerConfig> {
    let mut builder = ServerConfig::builder();
    if let Some(root) = &cli.docs_root {
        builder = builder.docs_root(root);
    }
    if let Some(rules) = &cli.rules {
        builder = builder.rules_path(rules);
    }
    if let Some(mode) = &cli.governance_mode {
        builder = builder.governance_mode(mode.parse::<GovernanceMode>()?);
    }
    Ok(builder.from_env()?.build()?)
}

/// Starts the MCP server with the specified transport.
///
/// Runs until the client disconnects (stdio) or the server is stopped (SSE).
fn cmd_serve(cmd: &ServeCommands, config: ServerConfig) -> Result<String> {
    let server = Logic64Server::new(config)?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    rt.block_on(async {
        match cmd {
            ServeCommands::Stdio => serve_stdio(server).await,
            ServeCommands::Sse { host, port } => serve_sse(server, host, *port).await,
        }
    })
    .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(String::new())
}

fn cmd_resolve(intent: &str, config: &ServerConfig, format: OutputFormat) -> Result<String> {
    let table = RuleTable::load(config.rules_path.as_deref())?;
    let result = resolve(&table, intent);
    Ok(format_resolution(&result, format))
}

fn cmd_verify(file: &Path, config: &ServerConfig, format: OutputFormat) -> Result<String> {
    let table = RuleTable::load(config.rules_path.as_deref())?;
    let (code, target) = if file == Path::new("-") {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        (code, None)
    } else {
        let code = std::fs::read_to_string(file).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to read {}: {e}", file.display()))
        })?;
        (code, Some(file.display().to_string()))
    };

    let report = verify(&table, &code, target.as_deref());
    let output = format_report(&report, format);
    if report.is_approved() {
        Ok(output)
    } else {
        Err(CommandError::ComplianceFailed(output).into())
    }
}

fn cmd_check(config: &ServerConfig, format: OutputFormat) -> Result<String> {
    let docs = DocumentStore::new(&config.docs_root);
    let missing: Vec<PathBuf> = docs.missing_required();
    let output = format_check(docs.root(), &missing, format);

    if config.governance_mode == GovernanceMode::Strict && !missing.is_empty() {
        return Err(CommandError::ExecutionFailed(output).into());
    }
    Ok(output)
}
