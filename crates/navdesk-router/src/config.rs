// File: src/config.rs
// Purpose: Configuration parsing from navdesk.toml

use crate::error::TableError;
use crate::history::DEFAULT_MAX_ENTRIES;
use crate::route::RouteDefinition;
use crate::store::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
use crate::table::RouteTable;
use crate::view::ViewProvider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterSettings,

    #[serde(default)]
    pub history: HistorySettings,

    /// Route manifest; the dashboard route set when omitted
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteManifestEntry>,
}

/// Router behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Prefix every environment location lives under (e.g. "/app")
    #[serde(default)]
    pub base_path: Option<String>,

    /// Whether routes match case-insensitively (default: false)
    #[serde(default = "default_false")]
    pub case_insensitive: bool,

    /// Maximum number of history entries kept
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

/// Which backend mirrors the history stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Memory,
    File,
}

/// History persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    #[serde(default)]
    pub store: HistoryBackend,

    /// File used by the `file` backend
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
}

/// One `[[routes]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifestEntry {
    pub path: String,
    pub name: String,

    /// View module identifier handed to the view resolver
    pub view: String,

    /// Load the view on first navigation instead of at startup (default: true)
    #[serde(default = "default_true")]
    pub lazy: bool,

    /// Artificial load latency for simulated loaders
    #[serde(default)]
    pub load_delay_ms: u64,

    /// Optional page title, stored as route meta
    #[serde(default)]
    pub title: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_max_history() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_history_path() -> PathBuf {
    PathBuf::from(".navdesk/history.json")
}

fn manifest(path: &str, name: &str, view: &str, lazy: bool, title: &str) -> RouteManifestEntry {
    RouteManifestEntry {
        path: path.to_string(),
        name: name.to_string(),
        view: view.to_string(),
        lazy,
        load_delay_ms: 0,
        title: Some(title.to_string()),
    }
}

/// The dashboard's route set: the landing view is bundled, the rest load on demand
pub fn default_routes() -> Vec<RouteManifestEntry> {
    vec![
        manifest("/", "dashboard", "DashboardView", false, "Dashboard"),
        manifest("/news", "news", "NewsView", true, "News"),
        manifest("/analysis", "analysis", "AnalysisView", true, "Analysis"),
        manifest("/configuration", "configuration", "ConfigurationView", true, "Configuration"),
        manifest("/trading", "trading", "TradingView", true, "Trading"),
        manifest("/backtester", "backtester", "BacktesterView", true, "Backtester"),
    ]
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            case_insensitive: false,
            max_history: default_max_history(),
        }
    }
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            store: HistoryBackend::Memory,
            path: default_history_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            router: RouterSettings::default(),
            history: HistorySettings::default(),
            routes: default_routes(),
        }
    }
}

impl Config {
    /// Load configuration from navdesk.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./navdesk.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("navdesk.toml")
    }

    /// Parse configuration text; empty text yields the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Build the route table, asking `resolve` for each route's provider
    ///
    /// The resolver is the host's mapping from view identifiers to loaders.
    pub fn build_table<F>(&self, mut resolve: F) -> Result<RouteTable, TableError>
    where
        F: FnMut(&RouteManifestEntry) -> ViewProvider,
    {
        let mut table = RouteTable::new().with_case_insensitive(self.router.case_insensitive);

        for entry in &self.routes {
            let mut route = RouteDefinition::new(&entry.path, entry.name.clone(), resolve(entry))?
                .with_meta("view", entry.view.clone());
            if let Some(ref title) = entry.title {
                route = route.with_meta("title", title.clone());
            }
            table.register(route)?;
        }

        Ok(table)
    }

    /// Create the configured history store
    pub fn create_store(&self) -> Arc<dyn HistoryStore> {
        match self.history.store {
            HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
            HistoryBackend::File => Arc::new(FileHistoryStore::new(self.history.path.clone())),
        }
    }
}
