//! In-process memory store.

use async_trait::async_trait;
use quill_error::QuillResult;
use quill_interface::{MemoryStore, SceneRecord};
use tokio::sync::RwLock;

/// Keeps committed scene records in memory, in commit order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<SceneRecord>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records.
    pub async fn records(&self) -> Vec<SceneRecord> {
        self.records.read().await.clone()
    }

    /// Number of committed records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether nothing has been committed.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn commit_scene(&self, record: SceneRecord) -> QuillResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }
}
