//! Longest-prefix subproject attribution (SPEC_FULL.md §4.6).
//!
//! This component only stores and queries [`Subproject`] rows; the
//! filesystem walk that discovers marker files is out of scope (SPEC_FULL.md
//! §1).

use crate::error::Result;
use crate::storage::Storage;
use crate::types::Subproject;

/// Resolves file paths to the most specific enclosing subproject.
///
/// Loaded once from storage and reused across a single indexing run rather
/// than querying per file.
pub struct SubprojectIndex {
    subprojects: Vec<Subproject>,
}

impl SubprojectIndex {
    pub async fn load(storage: &Storage) -> Result<Self> {
        let mut subprojects = storage.list_subprojects().await?;
        // Longer paths first so the first match is already the longest;
        // created_at as the tie-break keeps selection deterministic even
        // though equal-length distinct paths cannot occur under the
        // uniqueness invariant (SPEC_FULL.md §4.6).
        subprojects.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(Self { subprojects })
    }

    /// Returns the subproject whose `path` is the longest prefix of `file_path`.
    /// `.` is the root prefix and matches everything.
    pub fn subproject_for(&self, file_path: &str) -> Option<&Subproject> {
        self.subprojects.iter().find(|s| is_prefix(&s.path, file_path))
    }
}

fn is_prefix(prefix: &str, path: &str) -> bool {
    if prefix == "." {
        return true;
    }
    path == prefix || path.starts_with(&format!("{prefix}/"))
}

#[cfg(test)]
#[path = "subproject.test.rs"]
mod tests;
