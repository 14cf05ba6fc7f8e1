use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by the conversion, lookup and loading layers.
///
/// An absent symbol is [`CoreError::NotFound`]; text that fails the grammar is
/// one of the two `Malformed*` variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A graph-reading operation was requested while no program is bound.
    #[error("No program is loaded")]
    NotLoaded,

    /// The input path is missing, of the wrong kind, or unreadable.
    #[error("Invalid source path {path}: {reason}")]
    SourcePathInvalid { path: PathBuf, reason: String },

    /// A type descriptor did not match the descriptor grammar.
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// A member reference or identifier did not match the expected shape.
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// The requested class, member or interface does not exist in the graph.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Reconstructing or scanning one class failed during a bulk operation.
    ///
    /// Bulk operations log and drop this; it is only returned from
    /// single-class calls.
    #[error("Failed to process class {class}: {reason}")]
    PerClassFailure { class: String, reason: String },

    /// The program provider failed for a reason not covered above.
    #[error("Provider error: {0}")]
    Provider(String),
}

impl CoreError {
    pub fn source_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        CoreError::SourcePathInvalid { path: path.into(), reason: reason.into() }
    }

    pub fn per_class(class: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::PerClassFailure { class: class.into(), reason: reason.into() }
    }

    /// True for the two grammar failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, CoreError::MalformedDescriptor(_) | CoreError::MalformedReference(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
