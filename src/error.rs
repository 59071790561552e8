// Errors callers are expected to match on

/// Why an import failed
///
/// Every variant except `Storage` is a parse failure and leaves the store untouched.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import data is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("import data must be a JSON array of todos, found {found}")]
    NotArray { found: &'static str },

    #[error("entry {index} is not a valid todo: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// The list was replaced in memory but could not be written to the slot
    #[error("imported todos could not be saved: {0:#}")]
    Storage(eyre::Report),
}

impl ImportError {
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, ImportError::Storage(_))
    }
}
