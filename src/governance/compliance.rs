//! Deterministic compliance check for code snippets.
//!
//! Flags imports of forbidden technologies and styling patterns that bypass
//! Tailwind (inline `style={{ }}` objects and CSS modules).

use std::fmt::Write as _;

use regex::RegexBuilder;
use serde::Serialize;

use super::rules::RuleTable;

/// A single rule violation found in a snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// An import statement pulls in a forbidden technology.
    ForbiddenImport {
        /// Forbidden table entry.
        technology: String,
    },
    /// An inline style object was used.
    InlineStyle,
    /// A CSS module was imported.
    CssModule,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForbiddenImport { technology } => write!(
                f,
                "FORBIDDEN STACK: Import of '{technology}' detected. Use the approved stack instead."
            ),
            Self::InlineStyle => f.write_str("FORBIDDEN PATTERN: Inline styles detected (Use Tailwind)."),
            Self::CssModule => f.write_str("FORBIDDEN PATTERN: CSS Modules detected (Use Tailwind)."),
        }
    }
}

/// Result of checking one snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    /// File the snippet is destined for, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    /// Violations in detection order.
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    /// Returns `true` when no violations were found.
    pub fn is_approved(&self) -> bool {
        self.violations.is_empty()
    }

    /// Renders the report as the text returned to clients.
    pub fn render(&self) -> String {
        if self.is_approved() {
            return "APPROVED: Code follows Logic64 architectural guidelines.".to_string();
        }
        let mut out = String::from("REJECTED: Code violates architectural rules:\n");
        for (i, violation) in self.violations.iter().enumerate() {
            let _ = write!(out, "\n{}. {violation}", i + 1);
        }
        out
    }
}

/// Checks `code` against the forbidden stack and styling rules.
pub fn verify(table: &RuleTable, code: &str, target_file: Option<&str>) -> ComplianceReport {
    if let Some(file) = target_file {
        tracing::debug!(file, "verifying compliance");
    }

    let mut violations = Vec::new();

    for technology in &table.forbidden_technologies {
        let pattern = format!(
            r#"import.*['"]{}['"]"#,
            regex::escape(&technology.to_lowercase())
        );
        let matched = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .is_ok_and(|re| re.is_match(code));
        if matched {
            violations.push(Violation::ForbiddenImport {
                technology: technology.clone(),
            });
        }
    }

    if code.contains("style={{") {
        violations.push(Violation::InlineStyle);
    }

    if code.contains(".module.css") || code.contains(".module.scss") {
        violations.push(Violation::CssModule);
    }

    ComplianceReport {
        target_file: target_file.map(ToString::to_string),
        violations,
    }
}
