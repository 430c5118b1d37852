//! Server configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default document root.
const DEFAULT_DOCS_ROOT: &str = "data";
/// Default server name reported to MCP clients.
const DEFAULT_SERVER_NAME: &str = "logic64-mcp";
/// Default keep-alive interval for SSE streams.
const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

/// How strictly missing governance documents are treated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GovernanceMode {
    /// Missing documents are fatal.
    #[default]
    Strict,
    /// Missing documents are logged and the kernel runs ungoverned.
    Permissive,
}

impl GovernanceMode {
    /// Returns the string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }
}

impl fmt::Display for GovernanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GovernanceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(ConfigError::InvalidValue {
                key: "LOGIC64_GOVERNANCE_MODE".to_string(),
                value: other.to_string(),
                reason: "expected 'strict' or 'permissive'".to_string(),
            }),
        }
    }
}

/// Configuration for the governance kernel.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory governance documents are served from.
    pub docs_root: PathBuf,
    /// Name reported in the MCP handshake and health check.
    pub server_name: String,
    /// Startup strictness.
    pub governance_mode: GovernanceMode,
    /// Interval between SSE keep-alive comments.
    pub keep_alive: Duration,
    /// Optional JSON rule table replacing the built-in one.
    pub rules_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a new builder for `ServerConfig`.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env()?.build()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::from(DEFAULT_DOCS_ROOT),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            governance_mode: GovernanceMode::default(),
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            rules_path: None,
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    docs_root: Option<PathBuf>,
    server_name: Option<String>,
    governance_mode: Option<GovernanceMode>,
    keep_alive: Option<Duration>,
    rules_path: Option<PathBuf>,
}

impl ServerConfigBuilder {
    /// Populates unset fields from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        if self.docs_root.is_none() {
            self.docs_root = std::env::var_os("LOGIC64_DOCS_ROOT").map(PathBuf::from);
        }
        if self.server_name.is_none() {
            self.server_name = std::env::var("LOGIC64_SERVER_NAME").ok();
        }
        if self.governance_mode.is_none()
            && let Ok(mode) = std::env::var("LOGIC64_GOVERNANCE_MODE")
        {
            self.governance_mode = Some(mode.parse()?);
        }
        if self.keep_alive.is_none()
            && let Ok(secs) = std::env::var("LOGIC64_KEEP_ALIVE_SECS")
        {
            self.keep_alive = Some(parse_keep_alive(&secs)?);
        }
        if self.rules_path.is_none() {
            self.rules_path = std::env::var_os("LOGIC64_RULES_PATH").map(PathBuf::from);
        }
        Ok(self)
    }

    /// Sets the document root.
    #[must_use]
    pub fn docs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.docs_root = Some(root.into());
        self
    }

    /// Sets the server name.
    #[must_use]
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Sets the governance mode.
    #[must_use]
    pub const fn governance_mode(mut self, mode: GovernanceMode) -> Self {
        self.governance_mode = Some(mode);
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub const fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = Some(interval);
        self
    }

    /// Sets the rule table path.
    #[must_use]
    pub fn rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let keep_alive = self.keep_alive.unwrap_or(defaults.keep_alive);
        if keep_alive.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "keep_alive".to_string(),
                value: "0".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }

        Ok(ServerConfig {
            docs_root: self.docs_root.unwrap_or(defaults.docs_root),
            server_name: self.server_name.unwrap_or(defaults.server_name),
            governance_mode: self.governance_mode.unwrap_or(defaults.governance_mode),
            keep_alive,
            rules_path: self.rules_path,
        })
    }
}

fn parse_keep_alive(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            key: "LOGIC64_KEEP_ALIVE_SECS".to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}
