//! The router: resolution, on-demand view loading, history and notification
//!
//! Every navigation gets a generation number. Only the navigation holding the
//! current generation may touch the state machine, the active view or the
//! history; anything older is discarded when it reaches a commit point.

use crate::config::RouterSettings;
use crate::error::{Direction, ModuleLoadError, NavigationError};
use crate::events::{RouterEvent, RouterState, StateTransition};
use crate::history::{HistorySnapshot, HistoryStack, NavigationEntry, PendingEntry};
use crate::intent::{NavigateOptions, NavigationIntent, NavigationTarget};
use crate::path::{join_base, normalize_path, split_location, strip_base};
use crate::store::HistoryStore;
use crate::table::RouteTable;
use crate::view::{LoadStatus, ViewHandle, ViewProvider};
use anyhow::Result;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, OnceCell};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 100;

/// The view currently presented to the user
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveView {
    pub route_name: String,
    /// Normalized path, without query or fragment
    pub path: String,
    pub query: Option<String>,
    pub params: HashMap<String, String>,
    pub view_handle: ViewHandle,
    pub load_status: LoadStatus,
    /// Payload of the history entry this view was activated from
    pub state: Option<serde_json::Value>,
    /// Navigation generation that committed this view
    pub generation: u64,
}

/// A target resolved against the table, ready to activate
#[derive(Debug, Clone)]
struct Resolved {
    route_name: String,
    path: String,
    query: Option<String>,
    params: HashMap<String, String>,
    provider: ViewProvider,
}

/// How a successful activation changes history
#[derive(Debug)]
enum Commit {
    Push(Option<serde_json::Value>),
    Replace(Option<serde_json::Value>),
    Traverse(usize),
}

#[derive(Debug)]
struct Machine {
    generation: u64,
    state: RouterState,
}

/// Resolves navigation requests to views and owns the navigation history
///
/// Share one instance with the rendering layer through an `Arc`.
pub struct Router {
    table: Arc<RouteTable>,
    settings: RouterSettings,
    active: ArcSwapOption<ActiveView>,
    machine: Mutex<Machine>,
    history: Mutex<HistoryStack>,
    views: HashMap<String, OnceCell<ViewHandle>>,
    statuses: Mutex<HashMap<String, LoadStatus>>,
    events: broadcast::Sender<RouterEvent>,
    transitions: broadcast::Sender<StateTransition>,
    store: Option<Arc<dyn HistoryStore>>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("state", &self.state())
            .field("generation", &self.generation())
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Router {
    /// Creates a router over a finished route table
    pub fn new(table: RouteTable) -> Self {
        let views = table
            .iter()
            .filter(|route| route.provider().is_lazy())
            .map(|route| (route.name().to_string(), OnceCell::new()))
            .collect();

        let statuses = table
            .iter()
            .filter(|route| !route.provider().is_lazy())
            .map(|route| (route.name().to_string(), LoadStatus::Ready))
            .collect();

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (transitions, _) = broadcast::channel(EVENT_CAPACITY);
        let settings = RouterSettings {
            case_insensitive: table.is_case_insensitive(),
            ..RouterSettings::default()
        };

        Self {
            table: Arc::new(table),
            history: Mutex::new(HistoryStack::new(settings.max_history)),
            settings,
            active: ArcSwapOption::empty(),
            machine: Mutex::new(Machine {
                generation: 0,
                state: RouterState::Idle,
            }),
            views,
            statuses: Mutex::new(statuses),
            events,
            transitions,
            store: None,
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Applies base path and history cap (functional builder)
    ///
    /// Case sensitivity is a property of the table and is taken from it.
    pub fn with_settings(mut self, settings: RouterSettings) -> Self {
        self.history = Mutex::new(HistoryStack::new(settings.max_history));
        self.settings = RouterSettings {
            case_insensitive: self.table.is_case_insensitive(),
            ..settings
        };
        self
    }

    /// Mirrors history into a store after every commit (functional builder)
    pub fn with_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Snapshot of the active view; `None` until the first commit
    pub fn current_view(&self) -> Option<Arc<ActiveView>> {
        self.active.load_full()
    }

    pub fn state(&self) -> RouterState {
        self.machine.lock().state
    }

    /// Generation of the most recently issued navigation
    pub fn generation(&self) -> u64 {
        self.machine.lock().generation
    }

    pub fn history(&self) -> HistorySnapshot {
        self.history.lock().snapshot()
    }

    pub fn current_entry(&self) -> Option<NavigationEntry> {
        self.history.lock().current().cloned()
    }

    pub fn can_go_back(&self) -> bool {
        self.history.lock().can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.history.lock().can_go_forward()
    }

    /// Load status of a route's view; `None` if it was never requested
    pub fn load_status(&self, route_name: &str) -> Option<LoadStatus> {
        self.statuses.lock().get(route_name).copied()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Subscribe to terminal navigation events
    ///
    /// Each receiver buffers up to 100 events. A receiver that falls further
    /// behind gets `RecvError::Lagged` with the number of events it missed and
    /// then continues from the oldest retained event; `current_view()` is
    /// always the authoritative state.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Subscribe to every state machine transition
    ///
    /// Same buffering and lag behaviour as [`Router::subscribe`].
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<StateTransition> {
        self.transitions.subscribe()
    }

    /// Environment href for an in-app path (adds the base path)
    pub fn href(&self, path: &str) -> String {
        let path = normalize_path(path);
        match self.settings.base_path.as_deref() {
            Some(base) => join_base(base, &path),
            None => path.into_owned(),
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigates to a path or named route
    ///
    /// Issuing a navigation supersedes any navigation still loading; the older
    /// one resolves to [`NavigationError::Superseded`] and changes nothing.
    pub async fn navigate(
        &self,
        target: impl Into<NavigationTarget>,
        options: NavigateOptions,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        let target = target.into();
        let generation = self.begin();
        debug!(generation, ?target, "navigate");

        let resolved = match self.resolve(&target) {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.fail_resolution(generation, err)),
        };

        let commit = if options.replace {
            Commit::Replace(options.state)
        } else {
            Commit::Push(options.state)
        };

        self.activate(generation, resolved, commit).await
    }

    /// Navigates to an environment location such as `/app/news?x=1`
    ///
    /// The configured base path is stripped first.
    pub async fn handle_location(
        &self,
        location: &str,
        options: NavigateOptions,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        let Some(base) = self.settings.base_path.as_deref() else {
            return self.navigate(location, options).await;
        };

        let parts = split_location(location);
        let path = normalize_path(parts.path);
        match strip_base(&path, base) {
            Some(inner) => {
                let mut target = inner.to_string();
                if let Some(query) = parts.query {
                    target.push('?');
                    target.push_str(query);
                }
                self.navigate(target, options).await
            }
            None => {
                let generation = self.begin();
                Err(self.fail_resolution(
                    generation,
                    NavigationError::OutsideBase(location.to_string()),
                ))
            }
        }
    }

    /// Moves one entry back in history
    pub async fn back(&self) -> Result<Arc<ActiveView>, NavigationError> {
        self.traverse(Direction::Back).await
    }

    /// Moves one entry forward in history
    pub async fn forward(&self) -> Result<Arc<ActiveView>, NavigationError> {
        self.traverse(Direction::Forward).await
    }

    /// Runs a host intent
    pub async fn dispatch(
        &self,
        intent: NavigationIntent,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        match intent {
            NavigationIntent::Navigate { target, options } => self.navigate(target, options).await,
            NavigationIntent::Location(location) => {
                self.handle_location(&location, NavigateOptions::push()).await
            }
            NavigationIntent::Back => self.back().await,
            NavigationIntent::Forward => self.forward().await,
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Loads the persisted history into the stack
    ///
    /// Returns `false` when there is no store or nothing was saved. Any
    /// navigation still in flight is superseded.
    pub async fn restore_history(&self) -> Result<bool> {
        let Some(store) = self.store.as_ref() else {
            return Ok(false);
        };
        let Some(snapshot) = store.load().await? else {
            return Ok(false);
        };

        let entries = snapshot.entries.len();
        {
            let mut machine = self.machine.lock();
            self.history.lock().restore(snapshot)?;
            let generation = Self::bump(&mut machine);
            self.set_state(&mut machine, generation, RouterState::Idle);
        }

        info!(store = store.name(), entries, "history restored");
        Ok(true)
    }

    /// Restores persisted history and re-activates the entry under its cursor
    pub async fn resume(&self) -> Result<Option<Arc<ActiveView>>> {
        if !self.restore_history().await? {
            return Ok(None);
        }

        let current = {
            let mut machine = self.machine.lock();
            let history = self.history.lock();
            let current = history
                .cursor()
                .and_then(|index| history.get(index).cloned().map(|entry| (index, entry)));
            drop(history);
            current.map(|(index, entry)| (Self::bump(&mut machine), index, entry))
        };

        match current {
            Some((generation, index, entry)) => {
                self.transition(generation, RouterState::Resolving);
                let view = self.activate_entry(generation, index, entry).await?;
                Ok(Some(view))
            }
            None => Ok(None),
        }
    }

    async fn persist(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let _guard = self.persist_lock.lock().await;
        let snapshot = self.history.lock().snapshot();
        if let Err(e) = store.save(&snapshot).await {
            warn!(store = store.name(), error = %e, "failed to persist history");
        }
    }

    // ========================================================================
    // State machine
    // ========================================================================

    fn bump(machine: &mut Machine) -> u64 {
        machine.generation += 1;
        machine.generation
    }

    fn set_state(&self, machine: &mut Machine, generation: u64, to: RouterState) {
        let from = std::mem::replace(&mut machine.state, to);
        debug!(generation, %from, %to, "router transition");
        let _ = self.transitions.send(StateTransition {
            generation,
            from,
            to,
        });
    }

    /// Starts a new navigation, superseding any in flight
    fn begin(&self) -> u64 {
        let mut machine = self.machine.lock();
        let generation = Self::bump(&mut machine);
        self.set_state(&mut machine, generation, RouterState::Resolving);
        generation
    }

    /// Applies a transition if `generation` is still current
    fn transition(&self, generation: u64, to: RouterState) -> bool {
        let mut machine = self.machine.lock();
        if machine.generation != generation {
            return false;
        }
        self.set_state(&mut machine, generation, to);
        true
    }

    fn publish(&self, event: RouterEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ========================================================================
    // Resolution and activation
    // ========================================================================

    fn resolve(&self, target: &NavigationTarget) -> Result<Resolved, NavigationError> {
        match target {
            NavigationTarget::Path(location) => {
                let parts = split_location(location);
                let route_match = self.table.match_path(parts.path)?;
                Ok(Resolved {
                    route_name: route_match.route.name().to_string(),
                    path: normalize_path(parts.path).into_owned(),
                    query: parts.query.map(str::to_string),
                    params: route_match.params,
                    provider: route_match.route.provider().clone(),
                })
            }
            NavigationTarget::Named { name, params } => {
                let path = self.table.url_for(name, params)?;
                let route = self
                    .table
                    .lookup_by_name(name)
                    .ok_or_else(|| NavigationError::UnknownRouteName(name.clone()))?;
                let params = route
                    .pattern()
                    .param_names()
                    .filter_map(|key| params.get(key).map(|v| (key.to_string(), v.clone())))
                    .collect();
                Ok(Resolved {
                    route_name: name.clone(),
                    path,
                    query: None,
                    params,
                    provider: route.provider().clone(),
                })
            }
        }
    }

    fn fail_resolution(&self, generation: u64, err: NavigationError) -> NavigationError {
        if !self.transition(generation, RouterState::Failed) {
            return NavigationError::Superseded { generation };
        }

        match &err {
            NavigationError::NotFound(path) => {
                info!(generation, path = %path, "no route for path");
                self.publish(RouterEvent::NotFound {
                    generation,
                    path: path.clone(),
                });
            }
            other => {
                warn!(generation, error = %other, "navigation target rejected");
                self.publish(RouterEvent::RouteError {
                    generation,
                    error: other.clone(),
                });
            }
        }

        self.transition(generation, RouterState::Idle);
        err
    }

    fn fail_load(&self, generation: u64, route: &str, error: ModuleLoadError) -> NavigationError {
        if !self.transition(generation, RouterState::Failed) {
            debug!(generation, route, "discarding failed load of superseded navigation");
            return NavigationError::Superseded { generation };
        }

        warn!(generation, route, error = %error, "view failed to load");
        self.publish(RouterEvent::LoadError {
            generation,
            route: route.to_string(),
            error: error.clone(),
        });
        self.transition(generation, RouterState::Idle);

        NavigationError::ModuleLoad {
            route: route.to_string(),
            source: error,
        }
    }

    /// Obtains the view handle, loading and caching lazy views
    async fn obtain_view(
        &self,
        generation: u64,
        resolved: &Resolved,
    ) -> Result<ViewHandle, NavigationError> {
        let loader = match &resolved.provider {
            ViewProvider::Eager(handle) => return Ok(handle.clone()),
            ViewProvider::Lazy(loader) => loader,
        };

        let name = resolved.route_name.as_str();
        let Some(cell) = self.views.get(name) else {
            // Every lazy route gets a cell at construction
            return Err(self.fail_load(
                generation,
                name,
                ModuleLoadError::new("no view cache for route"),
            ));
        };

        if let Some(handle) = cell.get() {
            return Ok(handle.clone());
        }

        if !self.transition(generation, RouterState::Loading) {
            return Err(NavigationError::Superseded { generation });
        }
        self.statuses.lock().insert(name.to_string(), LoadStatus::Pending);
        debug!(generation, route = name, "loading view");

        match cell.get_or_try_init(|| loader.load()).await {
            Ok(handle) => {
                self.statuses.lock().insert(name.to_string(), LoadStatus::Ready);
                Ok(handle.clone())
            }
            Err(error) => {
                self.statuses.lock().insert(name.to_string(), LoadStatus::Failed);
                Err(self.fail_load(generation, name, error))
            }
        }
    }

    async fn activate(
        &self,
        generation: u64,
        resolved: Resolved,
        commit: Commit,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        let handle = self.obtain_view(generation, &resolved).await?;
        let view = self.commit(generation, resolved, handle, commit)?;
        self.persist().await;
        Ok(view)
    }

    /// Atomically publishes the new view and updates history
    fn commit(
        &self,
        generation: u64,
        resolved: Resolved,
        handle: ViewHandle,
        commit: Commit,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        let mut machine = self.machine.lock();
        if machine.generation != generation {
            debug!(generation, route = %resolved.route_name, "discarding superseded navigation");
            return Err(NavigationError::Superseded { generation });
        }

        let mut history = self.history.lock();
        let pending = |state| PendingEntry {
            path: resolved.path.clone(),
            name: resolved.route_name.clone(),
            query: resolved.query.clone(),
            state,
        };
        let state = match commit {
            Commit::Push(state) => history.push(pending(state)).state.clone(),
            Commit::Replace(state) => history.replace(pending(state)).state.clone(),
            Commit::Traverse(index) => {
                let moved = history.move_to(index).map(|entry| entry.state.clone());
                match moved {
                    Some(state) => state,
                    None => {
                        // History was restored underneath this traversal
                        drop(history);
                        self.set_state(&mut machine, generation, RouterState::Idle);
                        return Err(NavigationError::Superseded { generation });
                    }
                }
            }
        };
        drop(history);

        let view = Arc::new(ActiveView {
            route_name: resolved.route_name,
            path: resolved.path,
            query: resolved.query,
            params: resolved.params,
            view_handle: handle,
            load_status: LoadStatus::Ready,
            state,
            generation,
        });

        self.active.store(Some(Arc::clone(&view)));
        self.set_state(&mut machine, generation, RouterState::Active);
        info!(generation, route = %view.route_name, path = %view.path, "view activated");
        self.publish(RouterEvent::Activated {
            generation,
            view: Arc::clone(&view),
        });
        self.set_state(&mut machine, generation, RouterState::Idle);

        Ok(view)
    }

    // ========================================================================
    // History traversal
    // ========================================================================

    async fn traverse(&self, direction: Direction) -> Result<Arc<ActiveView>, NavigationError> {
        let target = {
            let mut machine = self.machine.lock();
            let history = self.history.lock();
            let index = match direction {
                Direction::Back => history.back_index(),
                Direction::Forward => history.forward_index(),
            };
            let target = index.and_then(|i| history.get(i).cloned().map(|entry| (i, entry)));
            drop(history);
            target.map(|(index, entry)| {
                let generation = Self::bump(&mut machine);
                self.set_state(&mut machine, generation, RouterState::Resolving);
                (generation, index, entry)
            })
        };

        let Some((generation, index, entry)) = target else {
            debug!(%direction, "history boundary reached");
            self.publish(RouterEvent::AtBoundary { direction });
            return Err(NavigationError::AtBoundary(direction));
        };

        debug!(generation, %direction, path = %entry.path, "traverse");
        self.activate_entry(generation, index, entry).await
    }

    async fn activate_entry(
        &self,
        generation: u64,
        index: usize,
        entry: NavigationEntry,
    ) -> Result<Arc<ActiveView>, NavigationError> {
        let resolved = match self.resolve_entry(&entry) {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.fail_resolution(generation, err)),
        };

        self.activate(generation, resolved, Commit::Traverse(index)).await
    }

    /// Resolves a history entry back to the route it was committed with
    ///
    /// Falls back to path matching only when that route no longer exists or
    /// no longer matches the recorded path.
    fn resolve_entry(&self, entry: &NavigationEntry) -> Result<Resolved, NavigationError> {
        let recorded = self.table.lookup_by_name(&entry.name).and_then(|route| {
            route
                .pattern()
                .matches(&entry.path, self.table.is_case_insensitive())
                .map(|params| (route, params))
        });

        if let Some((route, params)) = recorded {
            return Ok(Resolved {
                route_name: entry.name.clone(),
                path: entry.path.clone(),
                query: entry.query.clone(),
                params,
                provider: route.provider().clone(),
            });
        }

        let location = match entry.query {
            Some(ref query) => format!("{}?{}", entry.path, query),
            None => entry.path.clone(),
        };
        self.resolve(&NavigationTarget::Path(location))
    }
}
