use thiserror::Error;

#[derive(Error, Debug)]
pub enum FastLinkError {
    #[error("invalid link format: {0}")]
    Format(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("file #{index} {problem}")]
    FileEntry { index: usize, problem: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Zero usable records is informational, not a hard failure; callers
    // may present it without an error dialog.
    #[error("{0}")]
    Empty(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(String),
}

impl FastLinkError {
    /// True for outcomes that mean "nothing to do" rather than "broken".
    pub fn is_empty_result(&self) -> bool {
        matches!(self, FastLinkError::Empty(_))
    }
}

pub type Result<T> = std::result::Result<T, FastLinkError>;
