//! Error kinds for the indexing and retrieval engine.
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias
//! over [`PommelError`]. Kinds carry the structured context a caller needs
//! to branch on (a path, an expected/actual width) rather than a formatted
//! string, and cancellation is always its own kind so it is never mistaken
//! for an I/O failure.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PommelError>;

#[derive(Debug, thiserror::Error)]
pub enum PommelError {
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("invalid input: {0}")]
    Invalid(#[from] InvalidError),

    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    #[error("I/O error{}", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Io {
        path: Option<PathBuf>,
        #[source]
        cause: std::io::Error,
    },

    #[error("external error: {message}")]
    External {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("unsupported: {0}")]
    Unsupported(#[from] UnsupportedError),
}

#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("chunk not found: {chunk_id}")]
    Chunk { chunk_id: String },
    #[error("file not found: {path}")]
    File { path: String },
    #[error("subproject not found: {id}")]
    Subproject { id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidError {
    #[error("vector width mismatch: expected {expected}, got {actual}")]
    VectorWidthMismatch { expected: usize, actual: usize },
    #[error("batch length mismatch: {ids} ids but {vectors} vectors")]
    BatchLengthMismatch { ids: usize, vectors: usize },
    #[error("required field `{field}` is empty")]
    EmptyField { field: &'static str },
    #[error("limit must be positive, got {limit}")]
    NonPositiveLimit { limit: i64 },
    #[error("chunk span is invalid: start_line {start} > end_line {end}")]
    InvalidSpan { start: u32, end: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    #[error("schema version {found} is newer than the version {supported} this build understands")]
    SchemaTooNew { found: i64, supported: i64 },
    #[error(
        "embedding provider/model/width changed from ({old_provider}, {old_model}, {old_width}) to ({new_provider}, {new_model}, {new_width}); a full rebuild is required"
    )]
    EmbeddingIdentityChanged {
        old_provider: String,
        old_model: String,
        old_width: usize,
        new_provider: String,
        new_model: String,
        new_width: usize,
    },
    #[error("subproject path `{path}` is already registered")]
    SubprojectPathExists { path: String },
}

#[derive(Debug, thiserror::Error)]
pub enum UnsupportedError {
    #[error("no structural parser registered for language `{language}`")]
    LanguageNotSupported { language: String },
    #[error("lexical index is not enabled on this database")]
    LexicalIndexDisabled,
}

impl PommelError {
    pub fn io(cause: std::io::Error) -> Self {
        Self::Io { path: None, cause }
    }

    pub fn io_at(path: impl Into<PathBuf>, cause: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            cause,
        }
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::External {
            message: message.into(),
            cause: None,
        }
    }

    pub fn external_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn chunk_not_found(chunk_id: impl Into<String>) -> Self {
        NotFoundError::Chunk {
            chunk_id: chunk_id.into(),
        }
        .into()
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        NotFoundError::File { path: path.into() }.into()
    }

    /// True if this error originated from a cooperative cancellation check.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<rusqlite::Error> for PommelError {
    fn from(cause: rusqlite::Error) -> Self {
        Self::Io {
            path: None,
            cause: std::io::Error::new(std::io::ErrorKind::Other, cause),
        }
    }
}

impl From<tokio::task::JoinError> for PommelError {
    fn from(cause: tokio::task::JoinError) -> Self {
        Self::external_with_cause("background task panicked", cause)
    }
}
