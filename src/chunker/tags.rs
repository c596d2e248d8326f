//! Structural definition extraction via tree-sitter-tags.

use tree_sitter_tags::TagsContext;

use super::languages::SupportedLanguage;
use crate::error::{PommelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Class,
    Function,
    Method,
}

impl TagKind {
    fn from_syntax_type(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Self::Class),
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            _ => None,
        }
    }
}

/// A single extracted definition, with 1-based inclusive line bounds.
#[derive(Debug, Clone)]
pub struct CodeTag {
    pub name: String,
    pub kind: TagKind,
    pub start_line: u32,
    pub end_line: u32,
}

/// Extracts definitions from one file at a time. Holds a reusable
/// `TagsContext`; each indexing worker owns its own instance (SPEC_FULL.md
/// §5: "each worker owns its own chunker state").
pub struct TagExtractor {
    context: TagsContext,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TagExtractor {
    pub fn new() -> Self {
        Self {
            context: TagsContext::new(),
        }
    }

    pub fn extract(&mut self, source: &str, language: SupportedLanguage) -> Result<Vec<CodeTag>> {
        let config = language.tags_configuration()?;
        let source_bytes = source.as_bytes();

        let (tags, _errors) = self
            .context
            .generate_tags(&config, source_bytes, None)
            .map_err(|e| {
                PommelError::external_with_cause("tree-sitter-tags generation failed", e)
            })?;

        let mut result = Vec::new();
        for tag in tags {
            let tag = tag
                .map_err(|e| PommelError::external_with_cause("tree-sitter-tags entry failed", e))?;

            if !tag.is_definition {
                continue;
            }

            let Some(kind) =
                TagKind::from_syntax_type(config.syntax_type_name(tag.syntax_type_id))
            else {
                continue;
            };

            let name_range = tag.name_range;
            let name = std::str::from_utf8(&source_bytes[name_range.start..name_range.end])
                .unwrap_or("")
                .to_string();
            if name.is_empty() {
                continue;
            }

            let start_line = source[..tag.range.start].lines().count() as u32 + 1;
            let end_line = (source[..tag.range.end].lines().count() as u32).max(start_line);

            result.push(CodeTag {
                name,
                kind,
                start_line,
                end_line,
            });
        }

        Ok(result)
    }
}

/// Finds the innermost class-level tag that fully contains `[start,
/// end]`, to use as a method chunk's parent.
pub fn innermost_container<'a>(
    tags: &'a [CodeTag],
    start_line: u32,
    end_line: u32,
) -> Option<&'a CodeTag> {
    tags.iter()
        .filter(|t| t.kind == TagKind::Class)
        .filter(|t| t.start_line <= start_line && t.end_line >= end_line)
        .min_by_key(|t| t.end_line - t.start_line)
}

#[cfg(test)]
#[path = "tags.test.rs"]
mod tests;
