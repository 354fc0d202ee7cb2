//! Error types for route registration and navigation

use std::fmt;
use std::sync::Arc;

/// Errors raised while building a [`RouteTable`](crate::RouteTable)
///
/// These are configuration errors: startup should abort on them rather than
/// run with a partially registered table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("duplicate route path: {0}")]
    DuplicatePath(String),

    #[error("duplicate route name: {0}")]
    DuplicateName(String),

    /// Two patterns have the same shape, so every path matching one matches the other
    #[error("route pattern {pattern} is ambiguous with existing pattern {existing}")]
    AmbiguousRoute { pattern: String, existing: String },

    #[error("invalid route pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Failure reported by a view provider
///
/// Cheap to clone so the same failure can be returned to the caller and
/// published to observers.
#[derive(Debug, Clone)]
pub struct ModuleLoadError {
    message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl ModuleLoadError {
    /// Creates a load error with a message and no underlying cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a load error wrapping an underlying cause
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ModuleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ModuleLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<anyhow::Error> for ModuleLoadError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let source: Box<dyn std::error::Error + Send + Sync> = err.into();
        Self {
            message,
            source: Some(Arc::from(source)),
        }
    }
}

/// Which end of the history stack a traversal ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Back,
    Forward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Back => f.write_str("back"),
            Direction::Forward => f.write_str("forward"),
        }
    }
}

/// Errors returned by a single navigation attempt
///
/// None of these leave the router in an intermediate state: the active view
/// and history are exactly what they were before the attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NavigationError {
    #[error("no route matches path {0}")]
    NotFound(String),

    #[error("no route named {0}")]
    UnknownRouteName(String),

    #[error("route {route} requires parameter {param}")]
    MissingParameter { route: String, param: String },

    #[error("path {path} matches several routes equally: {}", .candidates.join(", "))]
    AmbiguousRoute {
        path: String,
        candidates: Vec<String>,
    },

    #[error("location {0} is outside the configured base path")]
    OutsideBase(String),

    #[error("failed to load view for route {route}: {source}")]
    ModuleLoad {
        route: String,
        #[source]
        source: ModuleLoadError,
    },

    /// A newer navigation was issued before this one committed
    #[error("navigation {generation} superseded by a newer navigation")]
    Superseded { generation: u64 },

    /// Informational: the history cursor is already at the requested end
    #[error("already at the {0} boundary of history")]
    AtBoundary(Direction),
}

impl NavigationError {
    /// Whether this outcome is informational rather than a failure
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            NavigationError::AtBoundary(_) | NavigationError::Superseded { .. }
        )
    }
}
