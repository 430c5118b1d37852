//! Architecture rule table.
//!
//! The table is the deterministic "Layer A" filter: a list of required and
//! forbidden technologies plus domain concepts whose trigger keywords pull
//! rule sets into an intent's context. It is loaded once at startup and
//! never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A domain concept: trigger keywords and the rules they activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Unique domain label (e.g. `"Database"`).
    pub domain: String,
    /// Lowercase keywords whose presence in an intent activates this concept.
    pub triggers: Vec<String>,
    /// Human-readable directives, in presentation order.
    pub rules: Vec<String>,
}

impl Concept {
    /// Builds a concept from string slices.
    pub fn new(domain: &str, triggers: &[&str], rules: &[&str]) -> Self {
        Self {
            domain: domain.to_string(),
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            rules: rules.iter().map(ToString::to_string).collect(),
        }
    }

    /// Returns `true` if any trigger occurs in the already-lowercased text.
    pub fn is_triggered_by(&self, lowered: &str) -> bool {
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }
}

/// Immutable architecture rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Technologies every change must build on.
    pub required_technologies: Vec<String>,
    /// Technologies that cause an intent to be rejected. Order matters: the
    /// first entry found in an intent is the one reported.
    pub forbidden_technologies: Vec<String>,
    /// Domain concepts, scanned in order.
    pub concepts: Vec<Concept>,
}

impl RuleTable {
    /// The compiled-in Logic64 stack rules.
    pub fn builtin() -> Self {
        Self {
            required_technologies: ["Next.js", "Hono", "Supabase", "Tailwind"]
                .map(String::from)
                .to_vec(),
            forbidden_technologies: [
                "Express",
                "MongoDB",
                "Redux",
                "Bootstrap",
                "Prisma",
                "Python",
                "PHP",
            ]
            .map(String::from)
            .to_vec(),
            concepts: vec![
                Concept::new(
                    "UI_Design",
                    &["button", "card", "layout", "css", "style", "component"],
                    &[
                        "USE: Tailwind CSS for all styling.",
                        "USE: Shadcn/UI components from @/components/ui.",
                        "FORBIDDEN: CSS Modules or Styled Components.",
                    ],
                ),
                Concept::new(
                    "Database",
                    &["table", "schema", "column", "sql", "migration", "store", "save"],
                    &[
                        "USE: Supabase JS Client for queries.",
                        "MANDATORY: Row Level Security (RLS) on all tables.",
                        "FORBIDDEN: ORMs like Prisma or TypeORM.",
                    ],
                ),
                Concept::new(
                    "Backend_API",
                    &["api", "route", "fetch", "endpoint", "server", "cors"],
                    &[
                        "USE: Hono for API routes (Edge Runtime).",
                        "USE: Server Actions for mutations (POST/PUT/DELETE).",
                        "FORBIDDEN: Traditional Express/Node.js patterns.",
                    ],
                ),
            ],
        }
    }

    /// Parses and validates a rule table from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidRuleTable(e.to_string()))?;
        table.validated()
    }

    /// Loads a rule table from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::RuleTableIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Loads the table at `path`, or the built-in table when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::builtin()), Self::from_json_file)
    }

    /// Checks structural invariants and normalizes triggers to lowercase.
    ///
    /// Empty entries are rejected: an empty trigger or forbidden term would
    /// match every intent.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let blank = |s: &String| s.trim().is_empty();

        if self.required_technologies.iter().any(blank) {
            return Err(ConfigError::InvalidRuleTable(
                "required technology entries must not be empty".into(),
            ));
        }
        if self.forbidden_technologies.iter().any(blank) {
            return Err(ConfigError::InvalidRuleTable(
                "forbidden technology entries must not be empty".into(),
            ));
        }

        let mut domains = HashSet::new();
        for concept in &mut self.concepts {
            if blank(&concept.domain) {
                return Err(ConfigError::InvalidRuleTable(
                    "concept domain must not be empty".into(),
                ));
            }
            if !domains.insert(concept.domain.clone()) {
                return Err(ConfigError::InvalidRuleTable(format!(
                    "duplicate concept domain '{}'",
                    concept.domain
                )));
            }
            if concept.triggers.is_empty() || concept.triggers.iter().any(blank) {
                return Err(ConfigError::InvalidRuleTable(format!(
                    "concept '{}' needs at least one non-empty trigger",
                    concept.domain
                )));
            }
            for trigger in &mut concept.triggers {
                *trigger = trigger.to_lowercase();
            }
        }

        Ok(self)
    }

    /// Returns the required stack as a display string.
    pub fn required_stack(&self) -> String {
        self.required_technologies.join(", ")
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}
