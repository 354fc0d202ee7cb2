//! The route table: registration, matching and reverse lookup

use crate::error::{NavigationError, TableError};
use crate::path::normalize_path;
use crate::route::{RouteDefinition, RouteMatch};
use std::collections::HashMap;

/// Ordered, immutable-after-startup set of routes
///
/// Lookups are indexed:
/// - Literal paths in a HashMap for O(1) exact matches
/// - Names in a HashMap for programmatic navigation
/// - Pattern shapes to reject registrations that could never be told apart
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    by_name: HashMap<String, usize>,
    by_path: HashMap<String, usize>,
    by_shape: HashMap<String, usize>,
    case_insensitive: bool,
}

impl RouteTable {
    /// Creates an empty, case-sensitive table
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures case sensitivity (functional builder)
    ///
    /// Must be set before routes are registered.
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Builds a table from a list of routes, failing fast on the first conflict
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::{RouteDefinition, RouteTable};
    ///
    /// let table = RouteTable::from_routes([
    ///     RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
    ///     RouteDefinition::eager("/news", "news", "NewsView").unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(table.match_path("/news").unwrap().route.name(), "news");
    /// ```
    pub fn from_routes<I>(routes: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = RouteDefinition>,
    {
        let mut table = Self::new();
        for route in routes {
            table.register(route)?;
        }
        Ok(table)
    }

    fn path_key(&self, path: &str) -> String {
        if self.case_insensitive {
            path.to_ascii_lowercase()
        } else {
            path.to_string()
        }
    }

    /// Registers a route
    ///
    /// All checks run before anything is inserted, so a failed registration
    /// leaves the table unchanged.
    pub fn register(&mut self, route: RouteDefinition) -> Result<(), TableError> {
        let path_key = self.path_key(route.path());
        if self.by_path.contains_key(&path_key) {
            return Err(TableError::DuplicatePath(route.path().to_string()));
        }

        if self.by_name.contains_key(route.name()) {
            return Err(TableError::DuplicateName(route.name().to_string()));
        }

        let shape = route.pattern().shape(self.case_insensitive);
        if let Some(&existing) = self.by_shape.get(&shape) {
            return Err(TableError::AmbiguousRoute {
                pattern: route.path().to_string(),
                existing: self.routes[existing].path().to_string(),
            });
        }

        let index = self.routes.len();
        self.by_path.insert(path_key, index);
        self.by_name.insert(route.name().to_string(), index);
        self.by_shape.insert(shape, index);
        self.routes.push(route);
        Ok(())
    }

    /// Matches a path against the table
    ///
    /// Exact literal match first. Otherwise every dynamic pattern is tried and
    /// the one with the fewest wildcards wins; equally specific matches are
    /// reported as [`NavigationError::AmbiguousRoute`].
    pub fn match_path(&self, path: &str) -> Result<RouteMatch<'_>, NavigationError> {
        let path = normalize_path(path);

        if let Some(&index) = self.by_path.get(&self.path_key(&path)) {
            let route = &self.routes[index];
            if route.pattern().is_literal() {
                return Ok(RouteMatch {
                    route,
                    params: HashMap::new(),
                });
            }
        }

        let candidates: Vec<RouteMatch<'_>> = self
            .routes
            .iter()
            .filter(|route| !route.pattern().is_literal())
            .filter_map(|route| {
                route
                    .pattern()
                    .matches(&path, self.case_insensitive)
                    .map(|params| RouteMatch { route, params })
            })
            .collect();

        let best = candidates
            .iter()
            .map(|m| m.route.pattern().wildcard_count())
            .min()
            .ok_or_else(|| NavigationError::NotFound(path.to_string()))?;

        let mut winners: Vec<RouteMatch<'_>> = candidates
            .into_iter()
            .filter(|m| m.route.pattern().wildcard_count() == best)
            .collect();

        if winners.len() > 1 {
            return Err(NavigationError::AmbiguousRoute {
                path: path.to_string(),
                candidates: winners.iter().map(|m| m.route.name().to_string()).collect(),
            });
        }

        winners
            .pop()
            .ok_or_else(|| NavigationError::NotFound(path.to_string()))
    }

    /// Finds a route by its symbolic name
    pub fn lookup_by_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(name).map(|&index| &self.routes[index])
    }

    /// Generates the path of a named route
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::{RouteDefinition, RouteTable};
    /// use std::collections::HashMap;
    ///
    /// let table = RouteTable::from_routes([
    ///     RouteDefinition::eager("/analysis/:symbol", "analysis", "AnalysisView").unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// let params = HashMap::from([("symbol".to_string(), "AAPL".to_string())]);
    /// assert_eq!(table.url_for("analysis", &params).unwrap(), "/analysis/AAPL");
    /// ```
    pub fn url_for(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, NavigationError> {
        let route = self
            .lookup_by_name(name)
            .ok_or_else(|| NavigationError::UnknownRouteName(name.to_string()))?;

        route
            .pattern()
            .generate(params)
            .map_err(|param| NavigationError::MissingParameter {
                route: name.to_string(),
                param,
            })
    }

    /// Routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}
