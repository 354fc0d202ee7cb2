//! In-memory history store

use crate::history::HistorySnapshot;
use crate::store::HistoryStore;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory history store
///
/// Keeps the last saved snapshot in memory. Clones share the same slot, so a
/// host can hand one clone to the router and keep another for inspection.
#[derive(Clone, Default)]
pub struct MemoryHistoryStore {
    slot: Arc<RwLock<Option<HistorySnapshot>>>,
    saves: Arc<RwLock<u64>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub async fn save_count(&self) -> u64 {
        *self.saves.read().await
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Option<HistorySnapshot>> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()> {
        *self.slot.write().await = Some(snapshot.clone());
        *self.saves.write().await += 1;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
