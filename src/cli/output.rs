//! Output formatting for CLI commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::governance::{ComplianceReport, ResolutionResult};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format string; anything other than `json` is text.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Formats an intent resolution.
pub fn format_resolution(result: &ResolutionResult<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
        OutputFormat::Text => match result {
            ResolutionResult::Rejected { reason, .. } => format!("REJECTED: {reason}"),
            ResolutionResult::NoMatch => "No matching rules.".to_string(),
            ResolutionResult::Matched { concepts } => {
                let mut out = String::new();
                for concept in concepts {
                    let _ = writeln!(out, "[{}]", concept.domain);
                    for rule in &concept.rules {
                        let _ = writeln!(out, "  - {rule}");
                    }
                }
                out.trim_end().to_string()
            }
        },
    }
}

/// Formats a compliance report.
pub fn format_report(report: &ComplianceReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => report.render(),
    }
}

/// Formats the governance document check.
pub fn format_check(root: &Path, missing: &[PathBuf], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "root": root.display().to_string(),
            "governed": missing.is_empty(),
            "missing": missing.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        }))
        .unwrap_or_default(),
        OutputFormat::Text => {
            let mut out = format!("Document root: {}\n", root.display());
            if missing.is_empty() {
                out.push_str("GOVERNED: all required documents present.");
            } else {
                out.push_str("UNGOVERNED: missing documents:");
                for path in missing {
                    let _ = write!(out, "\n  - {}", path.display());
                }
            }
            out
        }
    }
}
