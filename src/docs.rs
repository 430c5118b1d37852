//! Sandboxed access to governance documents.
//!
//! All reads go through [`DocumentStore`], which confines them to a single
//! document root. Document content is opaque UTF-8 text and is passed
//! through unchanged.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, DocumentError};

/// Contract every client must obey, relative to the document root.
pub const CONTRACT_PATH: &str = "system/contract.md";
/// Global architecture overview.
pub const GLOBAL_ARCHITECTURE_PATH: &str = "global_architecture.md";
/// Index of the individual spec files.
pub const SUMMARY_INDEX_PATH: &str = "summary_index.md";

/// Documents that must exist for the kernel to run governed.
pub const REQUIRED_DOCUMENTS: [&str; 3] =
    [CONTRACT_PATH, GLOBAL_ARCHITECTURE_PATH, SUMMARY_INDEX_PATH];

/// Documents addressable by id through `consult_documentation` and as
/// `logic64://` resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocNode {
    /// The system contract.
    Contract,
    /// Global architecture overview.
    GlobalArchitecture,
    /// Documentation index.
    SummaryIndex,
    /// Layer-B reasoning guide appended to cortex answers.
    CortexEngine,
    /// Map of all documentation.
    ContextMap,
    /// Detailed system architecture.
    SystemArchitecture,
}

impl DocNode {
    /// Every node, in listing order.
    pub const ALL: [Self; 6] = [
        Self::Contract,
        Self::GlobalArchitecture,
        Self::SummaryIndex,
        Self::CortexEngine,
        Self::ContextMap,
        Self::SystemArchitecture,
    ];

    /// Stable identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::GlobalArchitecture => "global_architecture",
            Self::SummaryIndex => "summary_index",
            Self::CortexEngine => "cortex_engine",
            Self::ContextMap => "context_map",
            Self::SystemArchitecture => "system_architecture",
        }
    }

    /// File path relative to the document root.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Contract => CONTRACT_PATH,
            Self::GlobalArchitecture => GLOBAL_ARCHITECTURE_PATH,
            Self::SummaryIndex => SUMMARY_INDEX_PATH,
            Self::CortexEngine => "cortex_engine.md",
            Self::ContextMap => "CONTEXT_MAP.md",
            Self::SystemArchitecture => "system_architecture.md",
        }
    }

    /// Human-readable title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Contract => "System Contract",
            Self::GlobalArchitecture => "Global Architecture",
            Self::SummaryIndex => "Documentation Index",
            Self::CortexEngine => "Cortex Engine",
            Self::ContextMap => "Context Map",
            Self::SystemArchitecture => "System Architecture Specification",
        }
    }

    /// Resource URI (`logic64://<id>`).
    pub fn uri(self) -> String {
        format!("logic64://{}", self.id())
    }

    /// Parses a resource URI back into a node.
    pub fn from_uri(uri: &str) -> Option<Self> {
        uri.strip_prefix("logic64://")
            .and_then(|id| id.parse().ok())
    }

    /// Comma-separated list of all ids, for error messages.
    pub fn valid_ids() -> String {
        Self::ALL.map(Self::id).join(", ")
    }
}

impl fmt::Display for DocNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DocNode {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|node| node.id() == s)
            .ok_or_else(|| DocumentError::UnknownNode {
                id: s.to_string(),
                valid: Self::valid_ids(),
            })
    }
}

/// Read-only view of the document root.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Creates a store rooted at `root`.
    ///
    /// The root is canonicalized when it exists so that the containment
    /// check compares like with like.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .or_else(|_| std::path::absolute(root))
            .unwrap_or_else(|_| root.to_path_buf());
        Self { root }
    }

    /// The (canonical) document root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Required documents that are missing, relative to the root.
    pub fn missing_required(&self) -> Vec<PathBuf> {
        REQUIRED_DOCUMENTS
            .iter()
            .map(PathBuf::from)
            .filter(|rel| !self.root.join(rel).is_file())
            .collect()
    }

    /// Fails with [`ConfigError::MissingDocuments`] if any required
    /// document is absent.
    pub fn ensure_required(&self) -> Result<(), ConfigError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingDocuments {
                root: self.root.clone(),
                missing,
            })
        }
    }

    /// Contract, global architecture and index concatenated into the
    /// handshake bundle clients load first.
    pub fn initial_context(&self) -> Result<String, DocumentError> {
        let contract = self.read_trusted(CONTRACT_PATH)?;
        let global = self.read_trusted(GLOBAL_ARCHITECTURE_PATH)?;
        let summary = self.read_trusted(SUMMARY_INDEX_PATH)?;

        Ok(format!(
            "\n=== CONTRACT (MUST OBEY) ===\n{contract}\n\n\
             === GLOBAL ARCHITECTURE ===\n{global}\n\n\
             === DOCUMENTATION INDEX (PICK ONE) ===\n{summary}\n"
        ))
    }

    /// Reads an enumerated document.
    pub fn read_node(&self, node: DocNode) -> Result<String, DocumentError> {
        self.read_trusted(node.path())
    }

    /// Reads an enumerated document if it exists.
    pub fn read_node_opt(&self, node: DocNode) -> Option<String> {
        self.read_node(node).ok()
    }

    /// Reads a client-supplied path relative to the root.
    ///
    /// The syntactic check and the containment check are both applied; a
    /// path must pass each independently.
    pub fn read_spec(&self, file_path: &str) -> Result<String, DocumentError> {
        let full = self.resolve_untrusted(file_path)?;
        if !full.is_file() {
            return Err(DocumentError::NotFound(file_path.to_string()));
        }
        read_file(&full)
    }

    /// Validates a client-supplied path and returns its absolute form.
    pub fn resolve_untrusted(&self, file_path: &str) -> Result<PathBuf, DocumentError> {
        if file_path.contains("..") || file_path.starts_with('/') || file_path.contains('\\') {
            tracing::warn!(file_path, "rejected document path");
            return Err(DocumentError::InvalidPath(file_path.to_string()));
        }

        let relative = Path::new(file_path);
        let lexically_contained = !relative.is_absolute()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let full = self.root.join(relative);

        // Symlinks inside the root may still point outside it.
        let resolved_contained = full
            .canonicalize()
            .map_or(true, |canonical| canonical.starts_with(&self.root));

        if !lexically_contained || !full.starts_with(&self.root) || !resolved_contained {
            tracing::warn!(file_path, "document path escapes the root");
            return Err(DocumentError::Traversal(file_path.to_string()));
        }

        Ok(full)
    }

    fn read_trusted(&self, relative: &str) -> Result<String, DocumentError> {
        let full = self.root.join(relative);
        if !full.is_file() {
            return Err(DocumentError::NotFound(relative.to_string()));
        }
        read_file(&full)
    }
}

fn read_file(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn setup() -> (TempDir, DocumentStore) {
        let dir = TempDir::new().unwrap_or_else(|_| unreachable!());
        let root = dir.path();
        std::fs::create_dir_all(root.join("system")).unwrap_or_else(|_| unreachable!());
        std::fs::create_dir_all(root.join("specs")).unwrap_or_else(|_| unreachable!());
        std::fs::write(root.join(CONTRACT_PATH), "obey").unwrap_or_else(|_| unreachable!());
        std::fs::write(root.join(GLOBAL_ARCHITECTURE_PATH), "seven layers")
            .unwrap_or_else(|_| unreachable!());
        std::fs::write(root.join(SUMMARY_INDEX_PATH), "- specs/database_rules.md")
            .unwrap_or_else(|_| unreachable!());
        std::fs::write(root.join("specs/database_rules.md"), "# Database\nUse RLS.")
            .unwrap_or_else(|_| unreachable!());
        let store = DocumentStore::new(root);
        (dir, store)
    }

    #[test]
    fn test_read_spec_inside_root() {
        let (_dir, store) = setup();
        let content = store.read_spec("specs/database_rules.md");
        assert_eq!(content.ok().as_deref(), Some("# Database\nUse RLS."));
    }

    #[test_case("../etc/passwd" ; "parent traversal")]
    #[test_case("specs/../../secret" ; "nested traversal")]
    #[test_case("/etc/passwd" ; "absolute path")]
    #[test_case("specs\\database_rules.md" ; "backslash")]
    fn test_read_spec_rejects_invalid_paths(path: &str) {
        let (_dir, store) = setup();
        assert!(matches!(
            store.read_spec(path),
            Err(DocumentError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_spec_rejects_symlink_escape() {
        let (dir, store) = setup();
        let outside = TempDir::new().unwrap_or_else(|_| unreachable!());
        std::fs::write(outside.path().join("secret.md"), "secret")
            .unwrap_or_else(|_| unreachable!());
        std::os::unix::fs::symlink(outside.path(), dir.path().join("specs/link"))
            .unwrap_or_else(|_| unreachable!());

        assert!(matches!(
            store.read_spec("specs/link/secret.md"),
            Err(DocumentError::Traversal(_))
        ));
    }

    #[test]
    fn test_read_spec_missing_file() {
        let (_dir, store) = setup();
        assert!(matches!(
            store.read_spec("specs/missing.md"),
            Err(DocumentError::NotFound(p)) if p == "specs/missing.md"
        ));
    }

    #[test]
    fn test_initial_context_sections() {
        let (_dir, store) = setup();
        let context = store.initial_context().unwrap_or_default();
        assert!(context.contains("=== CONTRACT (MUST OBEY) ===\nobey"));
        assert!(context.contains("=== GLOBAL ARCHITECTURE ===\nseven layers"));
        assert!(context.contains("=== DOCUMENTATION INDEX (PICK ONE) ===\n- specs/database_rules.md"));
    }

    #[test]
    fn test_missing_required() {
        let (dir, store) = setup();
        assert!(store.ensure_required().is_ok());
        std::fs::remove_file(dir.path().join(SUMMARY_INDEX_PATH)).unwrap_or_else(|_| unreachable!());
        assert_eq!(store.missing_required(), vec![PathBuf::from(SUMMARY_INDEX_PATH)]);
        assert!(matches!(
            store.ensure_required(),
            Err(ConfigError::MissingDocuments { .. })
        ));
    }

    #[test]
    fn test_doc_node_ids_round_trip() {
        for node in DocNode::ALL {
            assert_eq!(node.id().parse::<DocNode>().ok(), Some(node));
            assert_eq!(DocNode::from_uri(&node.uri()), Some(node));
        }
    }

    #[test]
    fn test_unknown_doc_node() {
        let err = "roadmap".parse::<DocNode>().err();
        assert!(matches!(err, Some(DocumentError::UnknownNode { id, .. }) if id == "roadmap"));
        assert_eq!(DocNode::from_uri("logic64://roadmap"), None);
        assert_eq!(DocNode::from_uri("file://contract"), None);
    }

    #[test]
    fn test_read_node() {
        let (_dir, store) = setup();
        assert_eq!(store.read_node(DocNode::Contract).ok().as_deref(), Some("obey"));
        assert!(store.read_node_opt(DocNode::CortexEngine).is_none());
    }
}
