//! Router state machine states and the events published to observers

use crate::error::{Direction, ModuleLoadError, NavigationError};
use crate::router::ActiveView;
use std::fmt;
use std::sync::Arc;

/// State of the navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Resolving,
    Loading,
    Active,
    Failed,
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouterState::Idle => "idle",
            RouterState::Resolving => "resolving",
            RouterState::Loading => "loading",
            RouterState::Active => "active",
            RouterState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A single state machine step, tagged with the navigation that caused it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub generation: u64,
    pub from: RouterState,
    pub to: RouterState,
}

/// Terminal outcome of a navigation attempt, as seen by observers
#[derive(Debug, Clone)]
pub enum RouterEvent {
    /// A new view became active
    Activated {
        generation: u64,
        view: Arc<ActiveView>,
    },
    /// No route matched the requested path
    NotFound { generation: u64, path: String },
    /// The target could not be resolved for another reason (ambiguity, unknown name, ...)
    RouteError {
        generation: u64,
        error: NavigationError,
    },
    /// The route matched but its view failed to load
    LoadError {
        generation: u64,
        route: String,
        error: ModuleLoadError,
    },
    /// Back/forward was requested at the end of history
    AtBoundary { direction: Direction },
}

impl RouterEvent {
    /// Short event kind label, used in logs and the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            RouterEvent::Activated { .. } => "activated",
            RouterEvent::NotFound { .. } => "not-found",
            RouterEvent::RouteError { .. } => "route-error",
            RouterEvent::LoadError { .. } => "load-error",
            RouterEvent::AtBoundary { .. } => "at-boundary",
        }
    }
}
