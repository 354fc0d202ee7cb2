//! What callers ask the router to do
//!
//! Host integrations (address bar, back/forward buttons, links) translate
//! their own events into [`NavigationIntent`] values; the router never talks
//! to an environment API directly.

use std::collections::HashMap;

/// Where to navigate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// A path, optionally with a query string and fragment
    Path(String),
    /// A route name plus values for its dynamic segments
    Named {
        name: String,
        params: HashMap<String, String>,
    },
}

impl NavigationTarget {
    pub fn path(path: impl Into<String>) -> Self {
        NavigationTarget::Path(path.into())
    }

    /// Named target without parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::NavigationTarget;
    ///
    /// let target = NavigationTarget::named("analysis").with_param("symbol", "AAPL");
    /// assert!(matches!(target, NavigationTarget::Named { .. }));
    /// ```
    pub fn named(name: impl Into<String>) -> Self {
        NavigationTarget::Named {
            name: name.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter; no-op for path targets
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let NavigationTarget::Named { ref mut params, .. } = self {
            params.insert(key.into(), value.into());
        }
        self
    }
}

impl From<&str> for NavigationTarget {
    fn from(path: &str) -> Self {
        NavigationTarget::Path(path.to_string())
    }
}

impl From<String> for NavigationTarget {
    fn from(path: String) -> Self {
        NavigationTarget::Path(path)
    }
}

/// Per-navigation options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
    /// Opaque payload stored on the history entry
    pub state: Option<serde_json::Value>,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            state: None,
        }
    }

    pub fn with_state(mut self, state: serde_json::Value) -> Self {
        self.state = Some(state);
        self
    }
}

/// A navigation request coming from the host environment
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationIntent {
    /// Programmatic navigation or a link click
    Navigate {
        target: NavigationTarget,
        options: NavigateOptions,
    },
    /// Address-bar change: a full location including any base path
    Location(String),
    /// Back button
    Back,
    /// Forward button
    Forward,
}

impl NavigationIntent {
    /// Parses the textual intent form used by the CLI and host scripts
    ///
    /// - `back` / `forward`
    /// - `@name` or `@name key=value ...` for named navigation
    /// - `replace /path` to replace the current entry
    /// - `location /base/path` for an address-bar change
    /// - anything else is a path
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::{NavigationIntent, NavigationTarget};
    ///
    /// assert_eq!(NavigationIntent::parse("back"), Some(NavigationIntent::Back));
    /// assert!(matches!(
    ///     NavigationIntent::parse("/news"),
    ///     Some(NavigationIntent::Navigate { target: NavigationTarget::Path(_), .. })
    /// ));
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let mut words = input.split_whitespace();
        let head = words.next()?;

        let intent = match head {
            "back" => NavigationIntent::Back,
            "forward" => NavigationIntent::Forward,
            "location" => NavigationIntent::Location(words.next()?.to_string()),
            "replace" => NavigationIntent::Navigate {
                target: NavigationTarget::path(words.next()?),
                options: NavigateOptions::replace(),
            },
            named if named.starts_with('@') => {
                let target = words.try_fold(NavigationTarget::named(&named[1..]), |t, pair| {
                    pair.split_once('=').map(|(k, v)| t.with_param(k, v))
                })?;
                NavigationIntent::Navigate {
                    target,
                    options: NavigateOptions::push(),
                }
            }
            path => NavigationIntent::Navigate {
                target: NavigationTarget::path(path),
                options: NavigateOptions::push(),
            },
        };

        Some(intent)
    }
}
