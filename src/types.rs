//! Core data types shared across the chunker, storage, search, and indexing
//! modules.

use serde::{Deserialize, Serialize};

/// Structural role of a [`Chunk`] within its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    File,
    Class,
    Method,
    Block,
    Lines,
}

impl Level {
    /// Short string tag used as the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Class => "class",
            Self::Method => "method",
            Self::Block => "block",
            Self::Lines => "lines",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "class" => Some(Self::Class),
            "method" => Some(Self::Method),
            "block" => Some(Self::Block),
            "lines" => Some(Self::Lines),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row in the `files` table.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub id: i64,
    pub path: String,
    pub content_hash: String,
    pub size: u64,
    pub modified_at: i64,
    pub indexed_at: i64,
    pub language: String,
}

/// A chunk of source text, the unit of embedding and retrieval.
///
/// `id` is a pure function of `(file_path, level, start_line, end_line,
/// content_hash)` — see [`crate::chunker::chunk_id`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub file_id: i64,
    pub level: Level,
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
    pub content: String,
    pub content_hash: String,
    pub parent_id: Option<String>,
    pub subproject_id: Option<String>,
    pub subproject_path: Option<String>,
}

impl Chunk {
    /// `start_line <= end_line` and both are >= 1.
    pub fn has_valid_span(&self) -> bool {
        self.start_line >= 1 && self.start_line <= self.end_line
    }

    /// Whether `other`'s span is fully contained in this chunk's span.
    pub fn contains_span(&self, other: &Chunk) -> bool {
        self.start_line <= other.start_line && self.end_line >= other.end_line
    }
}

/// A fixed-width embedding vector keyed by chunk id.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub chunk_id: String,
    pub vector: Vec<f32>,
}

/// A named, path-scoped region of the project tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Subproject {
    pub id: String,
    pub path: String,
    pub name: String,
    pub marker_file: Option<String>,
    pub language_hint: Option<String>,
    pub auto_detected: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Search mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Dense,
    Lexical,
    Hybrid,
}

/// The query itself: either raw text (tokenized/embedded by the engine) or
/// a precomputed vector supplied by the caller.
#[derive(Debug, Clone)]
pub enum Query {
    Text(String),
    Vector(Vec<f32>),
}

/// Relational filters applied before the dense/lexical sub-queries run.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub levels: Option<Vec<Level>>,
    pub path_prefix: Option<String>,
    pub subproject_id: Option<String>,
    pub chunk_id_allow_list: Option<Vec<String>>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.levels.is_none()
            && self.path_prefix.is_none()
            && self.subproject_id.is_none()
            && self.chunk_id_allow_list.is_none()
    }
}

/// Options accepted by [`crate::search::HybridSearcher::search`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: Query,
    pub limit: i64,
    pub filters: SearchFilters,
    pub mode: SearchMode,
}

/// A ranked hit, hydrated with its full chunk and owning-file metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk_id: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub level: Level,
    pub name: String,
    pub language: String,
    pub content: String,
    pub score: f64,
}

/// Raw `(chunk_id, score)` pair produced by one of the dense/lexical
/// sub-searches, before hydration. Higher is always better.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChunk {
    pub chunk_id: String,
    pub score: f64,
}

/// The metadata keys recognized in the `metadata` table.
pub mod metadata_keys {
    pub const EMBEDDING_PROVIDER: &str = "embedding.provider";
    pub const EMBEDDING_MODEL: &str = "embedding.model";
    pub const EMBEDDING_DIMENSIONS: &str = "embedding.dimensions";
    pub const SCHEMA_VERSION: &str = "schema.version";
    pub const LAST_INDEXED_AT: &str = "index.last_indexed_at";
}

/// Outcome of indexing a single file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Indexed { chunks: usize },
    Unchanged,
    Failed { error: String },
}

/// Report returned by [`crate::indexing::IndexPipeline::index`].
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub files_indexed: usize,
    pub files_unchanged: usize,
    pub files_failed: Vec<(String, String)>,
    pub chunks_written: usize,
    pub embeddings_written: usize,
}

impl IndexReport {
    pub fn record(&mut self, path: &str, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Indexed { chunks } => {
                self.files_indexed += 1;
                self.chunks_written += chunks;
                self.embeddings_written += chunks;
            }
            FileOutcome::Unchanged => self.files_unchanged += 1,
            FileOutcome::Failed { error } => self.files_failed.push((path.to_string(), error)),
        }
    }
}

/// A file handed to the chunker: its language tag, raw bytes, and mtime.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub language: String,
    pub content: String,
    pub modified_at: i64,
}
