//! Language registry: maps a language tag to a tree-sitter grammar and a
//! tags query used for structural definition extraction.

use tree_sitter_tags::TagsConfiguration;

use crate::error::{PommelError, Result, UnsupportedError};

/// Languages with a registered structural parser. Anything else falls
/// back to coarse block chunking (SPEC_FULL.md §4.1 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedLanguage {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
    Go,
    Java,
}

const PYTHON_TAGS: &str = r#"
(class_definition name: (identifier) @name) @definition.class
(function_definition name: (identifier) @name) @definition.function
"#;

const JS_TS_TAGS: &str = r#"
(class_declaration name: (_) @name) @definition.class
(interface_declaration name: (_) @name) @definition.class
(function_declaration name: (identifier) @name) @definition.function
(method_definition name: (property_identifier) @name) @definition.method
"#;

const RUST_TAGS: &str = r#"
(struct_item name: (type_identifier) @name) @definition.class
(trait_item name: (type_identifier) @name) @definition.class
(enum_item name: (type_identifier) @name) @definition.class
(function_item name: (identifier) @name) @definition.function
"#;

const GO_TAGS: &str = r#"
(type_declaration (type_spec name: (type_identifier) @name (struct_type))) @definition.class
(type_declaration (type_spec name: (type_identifier) @name (interface_type))) @definition.class
(function_declaration name: (identifier) @name) @definition.function
(method_declaration name: (field_identifier) @name) @definition.method
"#;

const JAVA_TAGS: &str = r#"
(class_declaration name: (identifier) @name) @definition.class
(interface_declaration name: (identifier) @name) @definition.class
(method_declaration name: (identifier) @name) @definition.method
"#;

impl SupportedLanguage {
    /// Resolve from the same tag stored on `files.language`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "tsx" | "jsx" => Some(Self::Tsx),
            "rust" | "rs" => Some(Self::Rust),
            "go" | "golang" => Some(Self::Go),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    /// Best-effort guess from a file extension, used when callers only
    /// have a path and no separately-declared language tag.
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?;
        Self::from_tag(ext)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
        }
    }

    fn grammar(&self) -> tree_sitter::Language {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn tags_query(&self) -> &'static str {
        match self {
            Self::Python => PYTHON_TAGS,
            Self::JavaScript | Self::TypeScript | Self::Tsx => JS_TS_TAGS,
            Self::Rust => RUST_TAGS,
            Self::Go => GO_TAGS,
            Self::Java => JAVA_TAGS,
        }
    }

    /// Build the tags configuration used by [`super::tags::TagExtractor`].
    pub fn tags_configuration(&self) -> Result<TagsConfiguration> {
        TagsConfiguration::new(self.grammar(), self.tags_query(), "").map_err(|e| {
            PommelError::external_with_cause(
                format!("failed to build tags query for {}", self.tag()),
                e,
            )
        })
    }
}

/// Convenience for callers that want a typed error on an unknown tag.
pub fn require_language(tag: &str) -> Result<SupportedLanguage> {
    SupportedLanguage::from_tag(tag).ok_or_else(|| {
        UnsupportedError::LanguageNotSupported {
            language: tag.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
#[path = "languages.test.rs"]
mod tests;
