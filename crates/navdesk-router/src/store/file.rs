//! JSON file history store

use crate::history::HistorySnapshot;
use crate::store::HistoryStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores the history snapshot as a single JSON file
///
/// Writes go to a temporary sibling file first and are renamed into place, so
/// a crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Result<Option<HistorySnapshot>> {
        let exists = fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to check history file: {:?}", self.path))?;
        if !exists {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read history file: {:?}", self.path))?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history file: {:?}", self.path))?;

        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &HistorySnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create history directory")?;
        }

        let content =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize history")?;

        let temp = self.temp_path();
        fs::write(&temp, content)
            .await
            .with_context(|| format!("Failed to write history file: {:?}", temp))?;
        fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("Failed to replace history file: {:?}", self.path))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove history file"),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
