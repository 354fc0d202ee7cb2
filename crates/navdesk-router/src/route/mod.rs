//! Route definitions
//!
//! A route binds a path pattern and a unique name to a view provider.

pub mod pattern;

pub use pattern::{classify_segment, PathPattern, Segment};

use crate::error::TableError;
use crate::view::{ViewHandle, ViewProvider};
use std::collections::HashMap;

/// A single route: pattern, name and view provider
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pattern: PathPattern,
    name: String,
    provider: ViewProvider,
    meta: HashMap<String, String>,
}

impl RouteDefinition {
    /// Creates a route, validating the pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::{RouteDefinition, ViewProvider};
    ///
    /// let route = RouteDefinition::new("/", "dashboard", ViewProvider::eager("DashboardView"))
    ///     .unwrap()
    ///     .with_meta("title", "Dashboard");
    ///
    /// assert_eq!(route.path(), "/");
    /// assert_eq!(route.name(), "dashboard");
    /// assert_eq!(route.get_meta("title"), Some("Dashboard"));
    /// ```
    pub fn new(
        path: &str,
        name: impl Into<String>,
        provider: ViewProvider,
    ) -> Result<Self, TableError> {
        Ok(Self {
            pattern: PathPattern::parse(path)?,
            name: name.into(),
            provider,
            meta: HashMap::new(),
        })
    }

    /// Route with an already-resolved view
    pub fn eager(
        path: &str,
        name: impl Into<String>,
        view: impl Into<ViewHandle>,
    ) -> Result<Self, TableError> {
        Self::new(path, name, ViewProvider::eager(view))
    }

    /// Sets a metadata key-value pair
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Normalized path pattern
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &ViewProvider {
        &self.provider
    }

    pub fn get_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    pub fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }
}

/// Result of matching a path against the table
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The matched route
    pub route: &'a RouteDefinition,
    /// Parameters extracted from dynamic segments
    pub params: HashMap<String, String>,
}
