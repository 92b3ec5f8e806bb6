use thiserror::Error;

/// Failures surfaced by the view layer. Each one is local to the panel that
/// hit it (table or chart).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("failed to fetch {resource}: {reason}")]
    FetchFailed { resource: String, reason: String },
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

impl ViewError {
    pub fn fetch_failed(resource: impl Into<String>, reason: impl ToString) -> Self {
        ViewError::FetchFailed {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        ViewError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
