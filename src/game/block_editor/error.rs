//! Editor Errors
//!
//! Every failure here is recoverable: the operation is aborted and the
//! scene keeps its previous state.

/// Errors returned by block editor operations.
#[derive(Debug)]
pub enum EditorError {
    /// No block, or no faces, selected.
    InvalidSelection(String),
    /// Partitioning or merging produced no usable geometry, or a snapshot
    /// carried malformed buffers.
    UnresolvedGeometry(String),
    /// A kind-specific rule forbids the operation.
    ForbiddenOperation(String),
    /// Kind id not present in the registry.
    UnknownKind(String),
    /// Snapshot or config (de)serialization failed.
    Json(serde_json::Error),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::InvalidSelection(msg) => write!(f, "invalid selection: {msg}"),
            EditorError::UnresolvedGeometry(msg) => write!(f, "unresolved geometry: {msg}"),
            EditorError::ForbiddenOperation(msg) => write!(f, "forbidden operation: {msg}"),
            EditorError::UnknownKind(id) => write!(f, "unknown kind: {id}"),
            EditorError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Json(e)
    }
}

impl EditorError {
    /// Text suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            EditorError::InvalidSelection(msg)
            | EditorError::UnresolvedGeometry(msg)
            | EditorError::ForbiddenOperation(msg) => msg.clone(),
            EditorError::UnknownKind(id) => format!("Unknown kind {id}"),
            EditorError::Json(e) => format!("Invalid data: {e}"),
        }
    }
}
