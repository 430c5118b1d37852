//! MCP server implementation for logic64.
//!
//! Exposes intent resolution, compliance checks and the governance document
//! set as MCP tools and resources. One [`Logic64Server`] value is cloned per
//! session; the rule table and document store are shared read-only.

use std::fmt::Write as _;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, CallToolResult, Content, Implementation, ListResourcesResult,
    PaginatedRequestParams, ProtocolVersion, RawResource, ReadResourceRequestParams,
    ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use super::params::{
    AskCortexParams, ConsultDocumentationParams, ReadSpecParams, VerifyComplianceParams,
    optional_str, required_str,
};
use crate::config::{GovernanceMode, ServerConfig};
use crate::docs::{DocNode, DocumentStore};
use crate::error::{ConfigError, DocumentError};
use crate::governance::{self, ResolutionResult, RuleTable};

/// Tool result flagged as an error, carrying `message` as text.
fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Client-facing text for a document error.
fn document_error_text(err: &DocumentError) -> String {
    match err {
        DocumentError::InvalidPath(_) | DocumentError::Traversal(_) => err.to_string(),
        _ => format!("ERROR: {err}"),
    }
}

/// JSON body returned by `ask_cortex` for a rejected intent.
#[derive(Debug, Serialize)]
struct Rejection<'a> {
    status: &'static str,
    intent: &'a str,
    reason: &'a str,
    forbidden_term: &'a str,
    required_stack: &'a [String],
}

/// Logic64 MCP server.
#[derive(Clone)]
pub struct Logic64Server {
    tool_router: ToolRouter<Self>,
    rules: Arc<RuleTable>,
    docs: Arc<DocumentStore>,
    config: Arc<ServerConfig>,
}

#[tool_router]
impl Logic64Server {
    /// Returns the contract, global architecture and documentation index.
    #[tool(
        name = "get_initial_context",
        description = "Get the System Contract, Global Architecture, and Documentation Index. CALL THIS FIRST."
    )]
    async fn get_initial_context(&self) -> Result<CallToolResult, McpError> {
        Ok(match self.docs.initial_context() {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => {
                tracing::error!(error = %e, "failed to load initial context");
                error_result(format!("Error loading context: {e}"))
            }
        })
    }

    /// Reads one spec file listed in the documentation index.
    #[tool(
        name = "read_specific_spec",
        description = "Read a specific technical spec file from the Index. Paths are relative to the document root (e.g. 'specs/database_rules.md')."
    )]
    async fn read_specific_spec(
        &self,
        Parameters(params): Parameters<ReadSpecParams>,
    ) -> Result<CallToolResult, McpError> {
        let file_path = match required_str(params.file_path, "file_path") {
            Ok(path) => path,
            Err(message) => return Ok(error_result(message)),
        };

        Ok(match self.docs.read_spec(&file_path) {
            Ok(content) => CallToolResult::success(vec![Content::text(content)]),
            Err(e) => error_result(document_error_text(&e)),
        })
    }

    /// Resolves an intent against the architecture rules.
    #[tool(
        name = "ask_cortex",
        description = "Describe what you intend to build. Returns a JSON rejection if the intent involves a forbidden technology, otherwise the architecture rules that apply to it. Call before implementing any feature."
    )]
    async fn ask_cortex(
        &self,
        Parameters(params): Parameters<AskCortexParams>,
    ) -> Result<CallToolResult, McpError> {
        let intent = match required_str(params.intent, "intent") {
            Ok(intent) => intent,
            Err(message) => return Ok(error_result(message)),
        };
        let current_file = match optional_str(params.current_file, "current_file") {
            Ok(file) => file,
            Err(message) => return Ok(error_result(message)),
        };

        tracing::info!(intent = %intent, current_file = current_file.as_deref(), "consulting cortex");

        let result = governance::resolve(&self.rules, &intent);
        let text = match &result {
            ResolutionResult::Rejected {
                reason,
                forbidden_term,
            } => {
                let rejection = Rejection {
                    status: "REJECTED",
                    intent: &intent,
                    reason,
                    forbidden_term,
                    required_stack: &self.rules.required_technologies,
                };
                serde_json::to_string_pretty(&rejection).map_err(|e| {
                    McpError::internal_error(format!("Serialization error: {e}"), None)
                })?
            }
            _ => self.context_bundle(&intent, current_file.as_deref(), &result),
        };

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Returns one document from the enumerated documentation set.
    #[tool(
        name = "consult_documentation",
        description = "Read a documentation node by id. Valid ids: contract, global_architecture, summary_index, cortex_engine, context_map, system_architecture."
    )]
    async fn consult_documentation(
        &self,
        Parameters(params): Parameters<ConsultDocumentationParams>,
    ) -> Result<CallToolResult, McpError> {
        let node_id = match required_str(params.node_id, "node_id") {
            Ok(id) => id,
            Err(message) => return Ok(error_result(message)),
        };

        let content = node_id
            .parse::<DocNode>()
            .and_then(|node| self.docs.read_node(node));

        Ok(match content {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(e) => error_result(document_error_text(&e)),
        })
    }

    /// Checks a code snippet for forbidden imports and styling patterns.
    #[tool(
        name = "verify_compliance",
        description = "Verify a code snippet against the Logic64 stack rules before submitting it. Flags forbidden imports, inline styles and CSS modules."
    )]
    async fn verify_compliance(
        &self,
        Parameters(params): Parameters<VerifyComplianceParams>,
    ) -> Result<CallToolResult, McpError> {
        let code = match required_str(params.code_snippet, "code_snippet") {
            Ok(code) => code,
            Err(message) => return Ok(error_result(message)),
        };
        let target_file = match optional_str(params.target_file, "target_file") {
            Ok(file) => file,
            Err(message) => return Ok(error_result(message)),
        };

        let report = governance::verify(&self.rules, &code, target_file.as_deref());
        Ok(CallToolResult::success(vec![Content::text(report.render())]))
    }
}

#[tool_handler]
impl ServerHandler for Logic64Server {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: self.config.server_name.clone(),
                title: Some("Logic64 Governance Kernel".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Logic64 governs code changes against the project architecture. Call \
                 `get_initial_context` first, then `ask_cortex` with your intent before \
                 implementing anything. Read individual specs with `read_specific_spec` \
                 and check code with `verify_compliance`."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = DocNode::ALL
            .into_iter()
            .map(|node| {
                let mut raw = RawResource::new(node.uri(), node.title().to_string());
                raw.description = Some(format!("Governance document {}", node.path()));
                raw.mime_type = Some("text/markdown".to_string());
                raw.no_annotation()
            })
            .collect();

        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParams { uri, .. }: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let node = DocNode::from_uri(&uri).ok_or_else(|| {
            McpError::resource_not_found(format!("Unknown resource: {uri}"), None)
        })?;

        let text = self.docs.read_node(node).map_err(|e| match e {
            DocumentError::NotFound(_) => {
                McpError::resource_not_found(format!("Resource {uri} is not available"), None)
            }
            other => McpError::internal_error(other.to_string(), None),
        })?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, uri)],
        })
    }
}

impl Logic64Server {
    /// Creates the server from configuration.
    ///
    /// Loads the rule table and checks the governance documents. In strict
    /// mode missing documents are an error; in permissive mode they are
    /// logged and the server runs ungoverned.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let rules = RuleTable::load(config.rules_path.as_deref())?;
        let docs = DocumentStore::new(&config.docs_root);

        match (docs.ensure_required(), config.governance_mode) {
            (Ok(()), _) => {
                tracing::info!(root = %docs.root().display(), "governance context loaded");
            }
            (Err(e), GovernanceMode::Strict) => return Err(e),
            (Err(e), GovernanceMode::Permissive) => {
                tracing::warn!(error = %e, "running in UNGOVERNED mode");
            }
        }

        Ok(Self::from_parts(config, rules, docs))
    }

    /// Assembles a server without startup checks.
    pub fn from_parts(config: ServerConfig, rules: RuleTable, docs: DocumentStore) -> Self {
        Self {
            tool_router: Self::tool_router(),
            rules: Arc::new(rules),
            docs: Arc::new(docs),
            config: Arc::new(config),
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Text bundle for a matched or unmatched intent.
    fn context_bundle(
        &self,
        intent: &str,
        current_file: Option<&str>,
        result: &ResolutionResult<'_>,
    ) -> String {
        let mut out = String::from("=== CORTEX CONTEXT ===\n");
        let _ = writeln!(out, "Intent: {intent}");
        if let Some(file) = current_file {
            let _ = writeln!(out, "Target File: {file}");
        }
        let _ = writeln!(out, "Required Stack: {}", self.rules.required_stack());

        out.push_str("\n=== ACTIVE RULES ===\n");
        match result {
            ResolutionResult::Matched { concepts } => {
                for concept in concepts {
                    let _ = writeln!(out, "[{}]", concept.domain);
                    for rule in &concept.rules {
                        let _ = writeln!(out, "- {rule}");
                    }
                    out.push('\n');
                }
            }
            _ => {
                out.push_str("No domain rules matched this intent. General guidance:\n");
                let _ = writeln!(out, "- Build only on the required stack: {}", self.rules.required_stack());
                out.push_str("- Consult the documentation index (get_initial_context) before proceeding.\n");
            }
        }

        if let Some(engine) = self.docs.read_node_opt(DocNode::CortexEngine) {
            out.push_str("\n=== CORTEX ENGINE ===\n");
            out.push_str(&engine);
            out.push('\n');
        }

        out
    }
}
