//! Error types for logic64.
//!
//! Each layer owns a focused error enum. Document and transport errors are
//! turned into tool results or log lines where they occur; [`Error`]
//! aggregates the ones that reach the CLI.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Startup configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A CLI command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure outside the document store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors. These are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Strict governance mode requires documents that are not present.
    #[error("governance documents missing under {}: {}", root.display(), format_paths(missing))]
    MissingDocuments {
        /// Document root that was checked.
        root: PathBuf,
        /// Required documents that were not found, relative to the root.
        missing: Vec<PathBuf>,
    },

    /// An environment variable or flag has an unusable value.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Value that was rejected.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The rule table file could not be read.
    #[error("failed to read rule table {}: {source}", path.display())]
    RuleTableIo {
        /// Path of the rule table file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The rule table failed to parse or validate.
    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),
}

/// Errors raised while resolving or reading governance documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The requested path is syntactically disallowed.
    #[error("ACCESS DENIED: Invalid path.")]
    InvalidPath(String),

    /// The requested path resolves outside the document root.
    #[error("ACCESS DENIED: Path traversal detected.")]
    Traversal(String),

    /// The requested file does not exist.
    #[error("File '{0}' not found.")]
    NotFound(String),

    /// No document is registered under this node id.
    #[error("Unknown documentation node '{id}'. Valid nodes: {valid}")]
    UnknownNode {
        /// Id that was requested.
        id: String,
        /// Comma-separated list of known ids.
        valid: String,
    },

    /// Reading the file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised by a session transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The outbound event stream is gone (client disconnected).
    #[error("event stream for session {0} is closed")]
    StreamClosed(String),

    /// A protocol message could not be serialized.
    #[error("failed to serialize message for session {session_id}: {source}")]
    Serialize {
        /// Session the message was addressed to.
        session_id: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Code failed the compliance check.
    #[error("{0}")]
    ComplianceFailed(String),

    /// The command could not run to completion.
    #[error("{0}")]
    ExecutionFailed(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
