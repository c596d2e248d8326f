//! Turns a source file into a forest of [`Chunk`]s (SPEC_FULL.md §4.1).

mod languages;
mod prefilter;
mod tags;

pub use languages::SupportedLanguage;
pub use prefilter::SkipReason;
pub use tags::{CodeTag, TagKind};

use crate::error::Result;
use crate::hash::sha256_hex;
use crate::types::{Chunk, Level, SourceFile};

const FALLBACK_BLOCK_LINES: u32 = 200;

/// Output of [`Chunker::chunk`].
#[derive(Debug, Clone)]
pub struct ChunkOutput {
    pub chunks: Vec<Chunk>,
    pub skipped: Option<SkipReason>,
}

/// Deterministic chunk id: a pure function of the chunk's file path,
/// level, span, and content hash (SPEC_FULL.md §4.1 step 4, §8 invariant
/// 5).
pub fn chunk_id(path: &str, level: Level, start_line: u32, end_line: u32, content_hash: &str) -> String {
    sha256_hex(format!("{path}:{}:{start_line}:{end_line}:{content_hash}", level.as_str()).as_bytes())
}

/// Owns per-worker chunker state. Each indexing worker constructs its own
/// instance (SPEC_FULL.md §5).
pub struct Chunker {
    tag_extractor: tags::TagExtractor,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker {
    pub fn new() -> Self {
        Self {
            tag_extractor: tags::TagExtractor::new(),
        }
    }

    pub fn chunk(&mut self, file_id: i64, file: &SourceFile) -> Result<ChunkOutput> {
        if let Some(reason) = prefilter::prefilter(&file.path, &file.content) {
            return Ok(ChunkOutput {
                chunks: Vec::new(),
                skipped: Some(reason),
            });
        }

        let root = file_chunk(file_id, file);

        let structural = SupportedLanguage::from_tag(&file.language).and_then(|lang| {
            match self.tag_extractor.extract(&file.content, lang) {
                Ok(tags) if !tags.is_empty() => Some(tags),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(path = %file.path, error = %e, "structural parse failed, falling back");
                    None
                }
            }
        });

        let mut chunks = vec![root.clone()];
        match structural {
            Some(tags) => chunks.extend(structural_chunks(file_id, file, &root.id, &tags)),
            None => chunks.extend(fallback_block_chunks(file_id, file, &root.id)),
        }

        chunks.sort_by_key(|c| (c.start_line, c.end_line));

        Ok(ChunkOutput {
            chunks,
            skipped: None,
        })
    }
}

fn file_chunk(file_id: i64, file: &SourceFile) -> Chunk {
    let num_lines = file.content.lines().count().max(1) as u32;
    let content_hash = sha256_hex(file.content.as_bytes());
    let id = chunk_id(&file.path, Level::File, 1, num_lines, &content_hash);
    Chunk {
        id,
        file_id,
        level: Level::File,
        name: String::new(),
        start_line: 1,
        end_line: num_lines,
        content: file.content.clone(),
        content_hash,
        parent_id: None,
        subproject_id: None,
        subproject_path: None,
    }
}

fn structural_chunks(
    file_id: i64,
    file: &SourceFile,
    root_id: &str,
    code_tags: &[CodeTag],
) -> Vec<Chunk> {
    let lines: Vec<&str> = file.content.lines().collect();
    let slice = |start: u32, end: u32| -> String {
        let start_idx = (start as usize).saturating_sub(1);
        let end_idx = (end as usize).min(lines.len());
        lines[start_idx..end_idx].join("\n")
    };

    let mut class_ids: std::collections::HashMap<(u32, u32), String> =
        std::collections::HashMap::new();
    let mut chunks = Vec::new();

    for tag in code_tags.iter().filter(|t| t.kind == TagKind::Class) {
        let content = slice(tag.start_line, tag.end_line);
        let content_hash = sha256_hex(content.as_bytes());
        let id = chunk_id(&file.path, Level::Class, tag.start_line, tag.end_line, &content_hash);
        class_ids.insert((tag.start_line, tag.end_line), id.clone());
        chunks.push(Chunk {
            id,
            file_id,
            level: Level::Class,
            name: tag.name.clone(),
            start_line: tag.start_line,
            end_line: tag.end_line,
            content,
            content_hash,
            parent_id: Some(root_id.to_string()),
            subproject_id: None,
            subproject_path: None,
        });
    }

    for tag in code_tags
        .iter()
        .filter(|t| matches!(t.kind, TagKind::Function | TagKind::Method))
    {
        let content = slice(tag.start_line, tag.end_line);
        let content_hash = sha256_hex(content.as_bytes());
        let id = chunk_id(&file.path, Level::Method, tag.start_line, tag.end_line, &content_hash);
        let parent_id = tags::innermost_container(code_tags, tag.start_line, tag.end_line)
            .and_then(|container| class_ids.get(&(container.start_line, container.end_line)))
            .cloned()
            .unwrap_or_else(|| root_id.to_string());

        chunks.push(Chunk {
            id,
            file_id,
            level: Level::Method,
            name: tag.name.clone(),
            start_line: tag.start_line,
            end_line: tag.end_line,
            content,
            content_hash,
            parent_id: Some(parent_id),
            subproject_id: None,
            subproject_path: None,
        });
    }

    chunks
}

/// Coarse ~200-line blocks, used when no structural parser is registered
/// for the language or the parse produced nothing usable.
fn fallback_block_chunks(file_id: i64, file: &SourceFile, root_id: &str) -> Vec<Chunk> {
    let lines: Vec<&str> = file.content.lines().collect();
    if lines.len() <= FALLBACK_BLOCK_LINES as usize {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < lines.len() {
        let end = (start + FALLBACK_BLOCK_LINES as usize).min(lines.len());
        let content = lines[start..end].join("\n");
        let content_hash = sha256_hex(content.as_bytes());
        let start_line = start as u32 + 1;
        let end_line = end as u32;
        let id = chunk_id(&file.path, Level::Block, start_line, end_line, &content_hash);
        chunks.push(Chunk {
            id,
            file_id,
            level: Level::Block,
            name: String::new(),
            start_line,
            end_line,
            content,
            content_hash,
            parent_id: Some(root_id.to_string()),
            subproject_id: None,
            subproject_path: None,
        });
        start = end;
    }
    chunks
}

#[cfg(test)]
#[path = "mod.test.rs"]
mod tests;
