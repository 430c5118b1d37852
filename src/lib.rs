//! Logic64 governance kernel.
//!
//! Resolves free-text coding intents against an immutable architecture rule
//! table, verifies code for forbidden imports and styling patterns, and
//! serves the governance documents to IDE agents over MCP. The server runs
//! on stdio or on a session-multiplexed Server-Sent-Events transport.
//!
//! # Example
//!
//! ```
//! use logic64::governance::{RuleTable, resolve};
//!
//! let table = RuleTable::builtin();
//! let result = resolve(&table, "add an Express server");
//! assert!(result.is_rejected());
//! ```

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod governance;
pub mod mcp;

pub use config::{GovernanceMode, ServerConfig};
pub use docs::{DocNode, DocumentStore};
pub use error::{Error, Result};
pub use governance::{ComplianceReport, ResolutionResult, RuleTable, resolve, verify};
pub use mcp::{Logic64Server, SessionRegistry};
