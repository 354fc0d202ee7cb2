//! Persistence backends for the navigation history

use crate::history::HistorySnapshot;
use anyhow::Result;
use async_trait::async_trait;

pub mod file;
pub mod memory;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;

/// Trait for history persistence backends
///
/// The router saves a snapshot after every committed navigation and may load
/// one at startup to continue a previous session's back/forward stack.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the last saved snapshot, if any
    async fn load(&self) -> Result<Option<HistorySnapshot>>;

    /// Save a snapshot, replacing the previous one
    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()>;

    /// Remove any saved snapshot
    async fn clear(&self) -> Result<()>;

    /// Get storage backend name
    fn name(&self) -> &'static str;
}
