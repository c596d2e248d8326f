//! Per-path async locks (SPEC_FULL.md §5 "Writes to the same file serialize
//! through a per-file lock to avoid interleaved chunk replacement").

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub struct FileLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for `path`, creating its entry on first use. Hold
    /// the returned guard for the duration of the file's reindex.
    pub async fn lock(&self, path: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
            entries
                .entry(path.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
#[path = "file_locks.test.rs"]
mod tests;
