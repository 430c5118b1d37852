//! Intent resolution.
//!
//! Maps a free-text intent to the rule sets it touches. Matching is plain
//! case-insensitive substring search with no word boundaries, so `"rapid"`
//! triggers on `"api"` and `"expressive"` is rejected for `"express"`.

use serde::Serialize;

use super::rules::{Concept, RuleTable};

/// Outcome of resolving one intent against a [`RuleTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionResult<'a> {
    /// The intent names a forbidden technology.
    Rejected {
        /// Explanation naming the required stack.
        reason: String,
        /// Forbidden table entry that matched, as written in the table.
        forbidden_term: String,
    },
    /// One or more concepts were triggered, in table order.
    Matched {
        /// Every concept with at least one trigger present in the intent.
        concepts: Vec<&'a Concept>,
    },
    /// Nothing in the table applies.
    NoMatch,
}

impl ResolutionResult<'_> {
    /// Returns `true` for [`ResolutionResult::Rejected`].
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Domains of the matched concepts; empty unless `Matched`.
    pub fn domains(&self) -> Vec<&str> {
        match self {
            Self::Matched { concepts } => concepts.iter().map(|c| c.domain.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Builds the rejection message for a forbidden term.
pub fn rejection_reason(term: &str, table: &RuleTable) -> String {
    format!(
        "Forbidden technology '{term}' requested. Logic64 requires the approved stack: {}.",
        table.required_stack()
    )
}

/// Resolves `intent` against `table`.
///
/// The forbidden list is checked first; the first entry in table order that
/// occurs in the intent wins. Otherwise all triggered concepts are returned.
pub fn resolve<'a>(table: &'a RuleTable, intent: &str) -> ResolutionResult<'a> {
    tracing::debug!(intent, "resolving intent");

    if intent.trim().is_empty() {
        return ResolutionResult::NoMatch;
    }

    let lowered = intent.to_lowercase();

    if let Some(term) = table
        .forbidden_technologies
        .iter()
        .find(|term| lowered.contains(term.to_lowercase().as_str()))
    {
        return ResolutionResult::Rejected {
            reason: rejection_reason(term, table),
            forbidden_term: term.clone(),
        };
    }

    let concepts: Vec<&Concept> = table
        .concepts
        .iter()
        .filter(|c| c.is_triggered_by(&lowered))
        .collect();

    if concepts.is_empty() {
        ResolutionResult::NoMatch
    } else {
        ResolutionResult::Matched { concepts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn sample_table() -> RuleTable {
        RuleTable {
            required_technologies: vec!["Hono".into(), "Supabase".into()],
            forbidden_technologies: vec!["express".into(), "mongodb".into()],
            concepts: vec![
                Concept::new("Database", &["database", "query"], &["Use Supabase."]),
                Concept::new("Frontend", &["ui", "page"], &["Use Tailwind."]),
            ],
        }
    }

    #[test]
    fn test_rejects_forbidden_import() {
        let table = sample_table();
        let result = resolve(&table, "import express from 'express'");
        assert_eq!(
            result,
            ResolutionResult::Rejected {
                reason: "Forbidden technology 'express' requested. Logic64 requires the approved stack: Hono, Supabase.".into(),
                forbidden_term: "express".into(),
            }
        );
    }

    #[test]
    fn test_matches_database() {
        let table = RuleTable {
            required_technologies: vec!["Supabase".into()],
            forbidden_technologies: vec!["mongodb".into()],
            concepts: vec![Concept::new("Database", &["database", "query"], &["Use Supabase."])],
        };
        let result = resolve(&table, "build a database query");
        assert_eq!(result.domains(), ["Database"]);
    }

    #[test]
    fn test_triggers_match_inside_words() {
        // "build" contains the "ui" trigger.
        let table = sample_table();
        let result = resolve(&table, "build a database query");
        assert_eq!(result.domains(), ["Database", "Frontend"]);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(resolve(&sample_table(), "hello world"), ResolutionResult::NoMatch);
    }

    #[test]
    fn test_empty_intent_never_matches() {
        assert_eq!(resolve(&sample_table(), ""), ResolutionResult::NoMatch);
        assert_eq!(resolve(&sample_table(), "   "), ResolutionResult::NoMatch);
    }

    #[test]
    fn test_collects_all_matching_concepts_in_table_order() {
        let table = sample_table();
        let result = resolve(&table, "a page that runs a query");
        assert_eq!(result.domains(), ["Database", "Frontend"]);
    }

    #[test]
    fn test_first_forbidden_entry_wins() {
        let table = sample_table();
        let result = resolve(&table, "mongodb behind an express server");
        assert!(
            matches!(result, ResolutionResult::Rejected { forbidden_term, .. } if forbidden_term == "express")
        );
    }

    #[test]
    fn test_rejection_beats_matching() {
        let table = sample_table();
        let result = resolve(&table, "express database");
        assert!(result.is_rejected());
    }

    #[test_case("EXPRESS middleware" ; "upper case")]
    #[test_case("Express middleware" ; "title case")]
    #[test_case("an expressive api" ; "embedded in a longer word")]
    fn test_substring_rejection(intent: &str) {
        assert!(resolve(&sample_table(), intent).is_rejected());
    }

    #[test]
    fn test_builtin_table_matches_case_of_entry() {
        let table = RuleTable::builtin();
        let result = resolve(&table, "add a redux store");
        assert!(
            matches!(result, ResolutionResult::Rejected { forbidden_term, .. } if forbidden_term == "Redux")
        );
    }

    #[test]
    fn test_serialized_shape() {
        let table = sample_table();
        let json = serde_json::to_value(resolve(&table, "db query")).unwrap_or_default();
        assert_eq!(json["status"], "MATCHED");
        assert_eq!(json["concepts"][0]["domain"], "Database");

        let json = serde_json::to_value(resolve(&table, "nothing")).unwrap_or_default();
        assert_eq!(json["status"], "NO_MATCH");
    }

    proptest! {
        #[test]
        fn prop_forbidden_in_any_case_is_rejected(
            prefix in "[a-z ]{0,12}",
            suffix in "[a-z ]{0,12}",
            upper in proptest::collection::vec(any::<bool>(), 7),
        ) {
            let table = sample_table();
            let term: String = "express"
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect();
            let intent = format!("{prefix}{term}{suffix}");
            let result = resolve(&table, &intent);
            let rejected_on_express = matches!(
                result,
                ResolutionResult::Rejected { ref forbidden_term, .. } if forbidden_term == "express"
            );
            prop_assert!(rejected_on_express);
        }

        #[test]
        fn prop_matched_iff_trigger_present(intent in "[a-z ]{0,40}") {
            let table = sample_table();
            let lowered = intent.to_lowercase();
            prop_assume!(!table.forbidden_technologies.iter().any(|f| lowered.contains(f.as_str())));

            let expected: Vec<&str> = table
                .concepts
                .iter()
                .filter(|c| c.triggers.iter().any(|t| lowered.contains(t.as_str())))
                .map(|c| c.domain.as_str())
                .collect();

            let result = resolve(&table, &intent);
            if expected.is_empty() {
                prop_assert_eq!(result, ResolutionResult::NoMatch);
            } else {
                prop_assert_eq!(result.domains(), expected);
            }
        }
    }
}
