//! Configuration recognized by the engine (see SPEC_FULL.md §6).
//!
//! Loading this from TOML/env/CLI flags is the caller's job; this struct
//! only defines the shape and defaults of what the engine understands.

use serde::{Deserialize, Serialize};

fn default_cache_capacity() -> usize {
    10_000
}

fn default_fusion_k() -> i64 {
    60
}

fn default_fusion_fanout() -> i64 {
    4
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubprojectsConfig {
    #[serde(default)]
    pub auto_detect: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub projects: Vec<SubprojectDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubprojectDecl {
    pub id: String,
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_fusion_k")]
    pub k: i64,
    #[serde(default = "default_fusion_fanout")]
    pub fanout: i64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            k: default_fusion_k(),
            fanout: default_fusion_fanout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PommelConfig {
    pub embedding: EmbeddingConfig,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default)]
    pub subprojects: SubprojectsConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
}

#[cfg(test)]
#[path = "config.test.rs"]
mod tests;
