//! Architecture governance: the rule table, intent resolution, and the
//! compliance check for code snippets.

pub mod compliance;
pub mod resolver;
pub mod rules;

pub use compliance::{ComplianceReport, Violation, verify};
pub use resolver::{ResolutionResult, rejection_reason, resolve};
pub use rules::{Concept, RuleTable};
