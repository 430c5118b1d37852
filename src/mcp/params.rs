//! MCP tool parameter types.
//!
//! Defines the input schemas for MCP tools using `schemars` for automatic
//! JSON Schema generation required by the MCP protocol.
//!
//! String arguments are accepted as raw JSON values so that a wrong type
//! comes back as a tool error the client can read, not as a protocol
//! failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for the `read_specific_spec` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ReadSpecParams {
    /// The path from the Index (e.g. `specs/database_rules.md`).
    #[schemars(with = "String")]
    pub file_path: Option<Value>,
}

/// Parameters for the `ask_cortex` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AskCortexParams {
    /// What you want to build (e.g. "database migration for invoices").
    #[schemars(with = "String")]
    pub intent: Option<Value>,

    /// File the change will land in, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub current_file: Option<Value>,
}

/// Parameters for the `consult_documentation` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConsultDocumentationParams {
    /// Documentation node id (e.g. `cortex_engine`, `context_map`).
    #[schemars(with = "String")]
    pub node_id: Option<Value>,
}

/// Parameters for the `verify_compliance` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VerifyComplianceParams {
    /// Code to verify.
    #[schemars(with = "String")]
    pub code_snippet: Option<Value>,

    /// Target file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub target_file: Option<Value>,
}

/// Extracts a required string argument.
///
/// Returns the client-facing error message when the value is missing or not
/// a string.
pub fn required_str(value: Option<Value>, name: &str) -> Result<String, String> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(format!("ERROR: Invalid input. '{name}' must be a string.")),
    }
}

/// Extracts an optional string argument; `null` counts as absent.
pub fn optional_str(value: Option<Value>, name: &str) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(format!("ERROR: Invalid input. '{name}' must be a string.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrong_type_still_deserializes() {
        let params: ReadSpecParams =
            serde_json::from_value(json!({"file_path": 42})).unwrap_or_default();
        assert_eq!(params.file_path, Some(json!(42)));
        assert!(required_str(params.file_path, "file_path").is_err());
    }

    #[test]
    fn test_missing_field_is_none() {
        let params: AskCortexParams = serde_json::from_value(json!({})).unwrap_or_default();
        assert!(params.intent.is_none());
        assert_eq!(
            required_str(params.intent, "intent").err().as_deref(),
            Some("ERROR: Invalid input. 'intent' must be a string.")
        );
    }

    #[test]
    fn test_optional_str() {
        assert_eq!(optional_str(None, "f"), Ok(None));
        assert_eq!(optional_str(Some(Value::Null), "f"), Ok(None));
        assert_eq!(optional_str(Some(json!("a.ts")), "f"), Ok(Some("a.ts".into())));
        assert!(optional_str(Some(json!([1])), "f").is_err());
    }
}
