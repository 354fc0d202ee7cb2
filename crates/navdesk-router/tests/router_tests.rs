//! Integration tests for navdesk-router
//!
//! Tests are organized by feature area:
//! - Route table matching and registration
//! - Navigation and the state machine
//! - Cancellation of superseded navigations
//! - Lazy view caching
//! - History traversal
//! - Base path handling
//! - History persistence

use navdesk_router::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn lazy_view(module: &'static str) -> ViewProvider {
    ViewProvider::lazy(move || async move { Ok(ViewHandle::new(module)) })
}

fn delayed_view(module: &'static str, delay_ms: u64) -> ViewProvider {
    ViewProvider::lazy(move || async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(ViewHandle::new(module))
    })
}

fn counting_view(module: &'static str, calls: Arc<AtomicUsize>) -> ViewProvider {
    ViewProvider::lazy(move || {
        let calls = Arc::clone(&calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(ViewHandle::new(module))
        }
    })
}

fn route(path: &str, name: &str, provider: ViewProvider) -> RouteDefinition {
    RouteDefinition::new(path, name, provider).unwrap()
}

/// The dashboard route set with every view bundled
fn eager_table() -> RouteTable {
    Config::default()
        .build_table(|entry| ViewProvider::eager(entry.view.as_str()))
        .unwrap()
}

fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<RouterEvent>) -> Vec<RouterEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

fn drain_transitions(
    rx: &mut tokio::sync::broadcast::Receiver<StateTransition>,
) -> Vec<(RouterState, RouterState)> {
    std::iter::from_fn(|| rx.try_recv().ok())
        .map(|t| (t.from, t.to))
        .collect()
}

fn history_names(router: &Router) -> Vec<String> {
    router
        .history()
        .entries
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

// ============================================================================
// Route table
// ============================================================================

#[rstest]
#[case("/", "dashboard")]
#[case("/news", "news")]
#[case("/analysis", "analysis")]
#[case("/configuration", "configuration")]
#[case("/trading", "trading")]
#[case("/backtester", "backtester")]
fn test_every_route_matches_itself(#[case] path: &str, #[case] name: &str) {
    let table = eager_table();
    let matched = table.match_path(path).unwrap();
    assert_eq!(matched.route.name(), name);
    assert_eq!(matched.route.path(), path);
    assert!(matched.params.is_empty());
}

#[test]
fn test_duplicate_path_leaves_table_unchanged() {
    let mut table = eager_table();
    let err = table
        .register(RouteDefinition::eager("/news", "headlines", "HeadlinesView").unwrap())
        .unwrap_err();

    assert_eq!(err, TableError::DuplicatePath("/news".to_string()));
    assert_eq!(table.len(), 6);
    assert!(table.lookup_by_name("headlines").is_none());
    assert_eq!(table.match_path("/news").unwrap().route.name(), "news");
}

#[test]
fn test_duplicate_name_leaves_table_unchanged() {
    let mut table = eager_table();
    let err = table
        .register(RouteDefinition::eager("/headlines", "news", "HeadlinesView").unwrap())
        .unwrap_err();

    assert_eq!(err, TableError::DuplicateName("news".to_string()));
    assert_eq!(table.len(), 6);
    assert!(matches!(
        table.match_path("/headlines"),
        Err(NavigationError::NotFound(_))
    ));
}

#[test]
fn test_literal_beats_pattern() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/analysis/:symbol", "analysis", "AnalysisView").unwrap(),
        RouteDefinition::eager("/analysis/overview", "overview", "OverviewView").unwrap(),
    ])
    .unwrap();

    assert_eq!(
        table.match_path("/analysis/overview").unwrap().route.name(),
        "overview"
    );

    let matched = table.match_path("/analysis/AAPL").unwrap();
    assert_eq!(matched.route.name(), "analysis");
    assert_eq!(matched.params.get("symbol"), Some(&"AAPL".to_string()));
}

#[test]
fn test_fewest_params_wins() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/trading/:desk/:symbol", "order", "OrderView").unwrap(),
        RouteDefinition::eager("/trading/fx/:symbol", "fx", "FxView").unwrap(),
    ])
    .unwrap();

    assert_eq!(table.match_path("/trading/fx/EURUSD").unwrap().route.name(), "fx");
    assert_eq!(
        table.match_path("/trading/eq/MSFT").unwrap().route.name(),
        "order"
    );
}

#[test]
fn test_equally_specific_match_is_ambiguous() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/reports/:year/summary", "summary", "SummaryView").unwrap(),
        RouteDefinition::eager("/reports/2024/:section", "section", "SectionView").unwrap(),
    ])
    .unwrap();

    match table.match_path("/reports/2024/summary") {
        Err(NavigationError::AmbiguousRoute { path, mut candidates }) => {
            candidates.sort();
            assert_eq!(path, "/reports/2024/summary");
            assert_eq!(candidates, vec!["section".to_string(), "summary".to_string()]);
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
}

#[test]
fn test_indistinguishable_patterns_rejected() {
    let err = RouteTable::from_routes([
        RouteDefinition::eager("/users/:id", "user", "UserView").unwrap(),
        RouteDefinition::eager("/users/:uid", "member", "MemberView").unwrap(),
    ])
    .unwrap_err();

    assert_eq!(
        err,
        TableError::AmbiguousRoute {
            pattern: "/users/:uid".to_string(),
            existing: "/users/:id".to_string(),
        }
    );
}

// ============================================================================
// Navigation and state machine
// ============================================================================

#[tokio::test]
async fn test_end_to_end_lazy_navigation() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        route("/news", "news", lazy_view("NewsView")),
    ])
    .unwrap();
    let router = Router::new(table);
    let mut transitions = router.subscribe_transitions();
    let mut events = router.subscribe();

    let view = router.navigate("/news", NavigateOptions::push()).await.unwrap();

    assert_eq!(
        drain_transitions(&mut transitions),
        vec![
            (RouterState::Idle, RouterState::Resolving),
            (RouterState::Resolving, RouterState::Loading),
            (RouterState::Loading, RouterState::Active),
            (RouterState::Active, RouterState::Idle),
        ]
    );

    let current = router.current_view().unwrap();
    assert_eq!(current.route_name, "news");
    assert_eq!(current.view_handle, "NewsView");
    assert_eq!(current.load_status, LoadStatus::Ready);
    assert_eq!(*current, *view);
    assert_eq!(router.state(), RouterState::Idle);
    assert_eq!(router.load_status("news"), Some(LoadStatus::Ready));

    let events = drain_events(&mut events);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "activated");
}

#[tokio::test]
async fn test_eager_route_skips_loading() {
    let router = Router::new(eager_table());
    let mut transitions = router.subscribe_transitions();

    router.navigate("/", NavigateOptions::push()).await.unwrap();

    assert_eq!(
        drain_transitions(&mut transitions),
        vec![
            (RouterState::Idle, RouterState::Resolving),
            (RouterState::Resolving, RouterState::Active),
            (RouterState::Active, RouterState::Idle),
        ]
    );
}

#[tokio::test]
async fn test_not_found_mutates_nothing() {
    let router = Router::new(eager_table());
    router.navigate("/news", NavigateOptions::push()).await.unwrap();
    let before = router.current_view().unwrap();
    let history_before = router.history();

    let mut events = router.subscribe();
    let mut transitions = router.subscribe_transitions();
    let err = router
        .navigate("/portfolio", NavigateOptions::push())
        .await
        .unwrap_err();

    assert!(matches!(err, NavigationError::NotFound(ref p) if p == "/portfolio"));
    assert!(Arc::ptr_eq(&before, &router.current_view().unwrap()));
    assert_eq!(router.history(), history_before);
    assert_eq!(router.state(), RouterState::Idle);

    match drain_events(&mut events).as_slice() {
        [RouterEvent::NotFound { path, .. }] => assert_eq!(path, "/portfolio"),
        other => panic!("expected a single NotFound event, got {:?}", other),
    }
    assert_eq!(
        drain_transitions(&mut transitions),
        vec![
            (RouterState::Idle, RouterState::Resolving),
            (RouterState::Resolving, RouterState::Failed),
            (RouterState::Failed, RouterState::Idle),
        ]
    );
}

#[tokio::test]
async fn test_ambiguous_path_mutates_nothing() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        RouteDefinition::eager("/reports/:kind", "report", "ReportView").unwrap(),
        RouteDefinition::eager("/:section/daily", "daily", "DailyView").unwrap(),
    ])
    .unwrap();
    let router = Router::new(table);
    router.navigate("/", NavigateOptions::push()).await.unwrap();
    let before = router.current_view().unwrap();
    let history_before = router.history();

    let mut events = router.subscribe();
    let mut transitions = router.subscribe_transitions();
    let err = router
        .navigate("/reports/daily", NavigateOptions::push())
        .await
        .unwrap_err();

    match err {
        NavigationError::AmbiguousRoute { path, mut candidates } => {
            candidates.sort();
            assert_eq!(path, "/reports/daily");
            assert_eq!(candidates, vec!["daily".to_string(), "report".to_string()]);
        }
        other => panic!("expected ambiguity, got {:?}", other),
    }
    assert!(Arc::ptr_eq(&before, &router.current_view().unwrap()));
    assert_eq!(router.history(), history_before);
    assert_eq!(router.state(), RouterState::Idle);

    assert!(matches!(
        drain_events(&mut events).as_slice(),
        [RouterEvent::RouteError {
            error: NavigationError::AmbiguousRoute { .. },
            ..
        }]
    ));
    assert_eq!(
        drain_transitions(&mut transitions),
        vec![
            (RouterState::Idle, RouterState::Resolving),
            (RouterState::Resolving, RouterState::Failed),
            (RouterState::Failed, RouterState::Idle),
        ]
    );
}

#[tokio::test]
async fn test_no_view_before_first_navigation() {
    let router = Router::new(eager_table());
    assert!(router.current_view().is_none());
    assert!(router.history().entries.is_empty());
}

#[tokio::test]
async fn test_load_failure_keeps_previous_view() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let flaky = ViewProvider::lazy(move || {
        let counter = Arc::clone(&counter);
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ModuleLoadError::new("chunk fetch failed"))
            } else {
                Ok(ViewHandle::new("TradingView"))
            }
        }
    });
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        route("/trading", "trading", flaky),
    ])
    .unwrap();
    let router = Router::new(table);
    router.navigate("/", NavigateOptions::push()).await.unwrap();

    let mut events = router.subscribe();
    let err = router
        .navigate("/trading", NavigateOptions::push())
        .await
        .unwrap_err();

    match err {
        NavigationError::ModuleLoad { route, source } => {
            assert_eq!(route, "trading");
            assert_eq!(source.message(), "chunk fetch failed");
        }
        other => panic!("expected a load error, got {:?}", other),
    }
    assert_eq!(router.current_view().unwrap().route_name, "dashboard");
    assert_eq!(history_names(&router), vec!["dashboard"]);
    assert_eq!(router.load_status("trading"), Some(LoadStatus::Failed));
    assert_eq!(router.state(), RouterState::Idle);
    assert!(matches!(
        drain_events(&mut events).as_slice(),
        [RouterEvent::LoadError { route, .. }] if route == "trading"
    ));

    // Caller-driven retry loads again
    let view = router.navigate("/trading", NavigateOptions::push()).await.unwrap();
    assert_eq!(view.view_handle, "TradingView");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(router.load_status("trading"), Some(LoadStatus::Ready));
}

#[tokio::test]
async fn test_replace_keeps_history_length() {
    let router = Router::new(eager_table());
    router.navigate("/", NavigateOptions::push()).await.unwrap();
    router
        .navigate(
            "/news",
            NavigateOptions::replace().with_state(serde_json::json!({ "from": "redirect" })),
        )
        .await
        .unwrap();

    let history = router.history();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.cursor, Some(0));
    assert_eq!(history.entries[0].name, "news");
    assert_eq!(
        history.entries[0].state,
        Some(serde_json::json!({ "from": "redirect" }))
    );
    assert!(matches!(router.back().await, Err(NavigationError::AtBoundary(Direction::Back))));
}

#[tokio::test]
async fn test_named_navigation_errors() {
    let router = Router::new(eager_table());
    let mut events = router.subscribe();

    let err = router
        .navigate(NavigationTarget::named("portfolio"), NavigateOptions::push())
        .await
        .unwrap_err();
    assert!(matches!(err, NavigationError::UnknownRouteName(ref n) if n == "portfolio"));
    assert!(matches!(
        drain_events(&mut events).as_slice(),
        [RouterEvent::RouteError { .. }]
    ));

    let view = router
        .navigate(NavigationTarget::named("backtester"), NavigateOptions::push())
        .await
        .unwrap();
    assert_eq!(view.path, "/backtester");
}

#[tokio::test]
async fn test_dispatch_parsed_intents() {
    let router = Router::new(eager_table());

    for line in ["/", "/news", "@trading", "back"] {
        let intent = NavigationIntent::parse(line).unwrap();
        router.dispatch(intent).await.unwrap();
    }

    assert_eq!(router.current_view().unwrap().route_name, "news");
    assert_eq!(history_names(&router), vec!["dashboard", "news", "trading"]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_load_is_superseded() {
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        route("/analysis", "analysis", delayed_view("AnalysisView", 500)),
        route("/news", "news", delayed_view("NewsView", 50)),
    ])
    .unwrap();
    let router = Router::new(table);
    let mut events = router.subscribe();

    let (first, second) = tokio::join!(
        router.navigate("/analysis", NavigateOptions::push()),
        router.navigate("/news", NavigateOptions::push()),
    );

    assert!(matches!(first, Err(NavigationError::Superseded { generation: 1 })));
    assert_eq!(second.unwrap().route_name, "news");

    let current = router.current_view().unwrap();
    assert_eq!(current.route_name, "news");
    assert_eq!(current.generation, 2);
    assert_eq!(history_names(&router), vec!["news"]);
    assert_eq!(router.state(), RouterState::Idle);

    // Only the winning navigation is announced
    let kinds: Vec<_> = drain_events(&mut events).iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["activated"]);

    // The superseded load still completed and is cached
    assert_eq!(router.load_status("analysis"), Some(LoadStatus::Ready));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failure_is_silent() {
    let failing = ViewProvider::lazy(|| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        Err(ModuleLoadError::new("timed out"))
    });
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        route("/backtester", "backtester", failing),
    ])
    .unwrap();
    let router = Router::new(table);
    let mut events = router.subscribe();

    let (first, second) = tokio::join!(
        router.navigate("/backtester", NavigateOptions::push()),
        router.navigate("/", NavigateOptions::push()),
    );

    assert!(matches!(first, Err(NavigationError::Superseded { .. })));
    assert_eq!(second.unwrap().route_name, "dashboard");
    assert_eq!(router.current_view().unwrap().route_name, "dashboard");

    let kinds: Vec<_> = drain_events(&mut events).iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["activated"]);
}

#[tokio::test(start_paused = true)]
async fn test_shared_router_across_tasks() {
    let table = RouteTable::from_routes([
        route("/analysis", "analysis", delayed_view("AnalysisView", 200)),
        route("/trading", "trading", delayed_view("TradingView", 20)),
    ])
    .unwrap();
    let router = Arc::new(Router::new(table));

    let slow = tokio::spawn({
        let router = Arc::clone(&router);
        async move { router.navigate("/analysis", NavigateOptions::push()).await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;
    let fast = router.navigate("/trading", NavigateOptions::push()).await;

    assert!(fast.is_ok());
    assert!(slow.await.unwrap().unwrap_err().is_informational());
    assert_eq!(router.current_view().unwrap().view_handle, "TradingView");
}

// ============================================================================
// Lazy view cache
// ============================================================================

#[tokio::test]
async fn test_lazy_provider_invoked_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let table = RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        route("/news", "news", counting_view("NewsView", Arc::clone(&calls))),
    ])
    .unwrap();
    let router = Router::new(table);
    let mut transitions = router.subscribe_transitions();

    router.navigate("/news", NavigateOptions::push()).await.unwrap();
    router.navigate("/", NavigateOptions::push()).await.unwrap();
    drain_transitions(&mut transitions);

    router.navigate("/news", NavigateOptions::push()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // Cached views go straight to Active
    assert!(!drain_transitions(&mut transitions)
        .iter()
        .any(|&(_, to)| to == RouterState::Loading));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_loads_share_one_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let provider = ViewProvider::lazy(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(ViewHandle::new("ConfigurationView"))
        }
    });
    let table = RouteTable::from_routes([route("/configuration", "configuration", provider)]).unwrap();
    let router = Router::new(table);

    let (first, second) = tokio::join!(
        router.navigate("/configuration", NavigateOptions::push()),
        router.navigate("/configuration", NavigateOptions::push()),
    );

    assert!(first.is_err());
    assert_eq!(second.unwrap().view_handle, "ConfigurationView");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(router.history().entries.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_status_pending_while_loading() {
    let table =
        RouteTable::from_routes([route("/news", "news", delayed_view("NewsView", 100))]).unwrap();
    let router = Router::new(table);
    assert_eq!(router.load_status("news"), None);

    let navigation = router.navigate("/news", NavigateOptions::push());
    tokio::pin!(navigation);

    tokio::select! {
        _ = &mut navigation => panic!("load should still be pending"),
        _ = tokio::time::sleep(Duration::from_millis(10)) => {}
    }
    assert_eq!(router.load_status("news"), Some(LoadStatus::Pending));
    assert_eq!(router.state(), RouterState::Loading);

    navigation.await.unwrap();
    assert_eq!(router.load_status("news"), Some(LoadStatus::Ready));
}

// ============================================================================
// History traversal
// ============================================================================

#[tokio::test]
async fn test_back_restores_previous_and_navigate_truncates() {
    let router = Router::new(eager_table());
    router.navigate("/news", NavigateOptions::push()).await.unwrap();
    router.navigate("/analysis", NavigateOptions::push()).await.unwrap();

    let view = router.back().await.unwrap();
    assert_eq!(view.route_name, "news");
    assert_eq!(router.history().cursor, Some(0));
    assert!(router.can_go_forward());

    let view = router.forward().await.unwrap();
    assert_eq!(view.route_name, "analysis");
    router.back().await.unwrap();

    router.navigate("/trading", NavigateOptions::push()).await.unwrap();
    assert_eq!(history_names(&router), vec!["news", "trading"]);
    assert!(!router.can_go_forward());

    let err = router.forward().await.unwrap_err();
    assert!(matches!(err, NavigationError::AtBoundary(Direction::Forward)));
    assert_eq!(router.current_view().unwrap().route_name, "trading");
}

fn overlapping_analysis_table() -> RouteTable {
    RouteTable::from_routes([
        RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
        RouteDefinition::eager("/analysis/summary", "summary", "SummaryView").unwrap(),
        RouteDefinition::eager("/analysis/:symbol", "symbol", "SymbolView").unwrap(),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_back_returns_to_named_route() {
    let router = Router::new(overlapping_analysis_table());
    let first = router
        .navigate(
            NavigationTarget::named("symbol").with_param("symbol", "summary"),
            NavigateOptions::push(),
        )
        .await
        .unwrap();
    assert_eq!(first.route_name, "symbol");
    assert_eq!(first.path, "/analysis/summary");

    router.navigate("/", NavigateOptions::push()).await.unwrap();
    let view = router.back().await.unwrap();

    assert_eq!(view.route_name, first.route_name);
    assert_eq!(view.view_handle, "SymbolView");
    assert_eq!(view.params.get("symbol"), Some(&"summary".to_string()));
    assert_eq!(router.current_entry().unwrap().name, "symbol");
}

#[tokio::test]
async fn test_resume_returns_to_named_route() {
    let store = MemoryHistoryStore::new();
    let first = Router::new(overlapping_analysis_table()).with_store(Arc::new(store.clone()));
    first
        .navigate(
            NavigationTarget::named("symbol").with_param("symbol", "summary"),
            NavigateOptions::push(),
        )
        .await
        .unwrap();

    let second = Router::new(overlapping_analysis_table()).with_store(Arc::new(store));
    let view = second.resume().await.unwrap().unwrap();
    assert_eq!(view.route_name, "symbol");
    assert_eq!(view.view_handle, "SymbolView");
}

#[tokio::test]
async fn test_back_falls_back_to_path_for_unknown_name() {
    let store = MemoryHistoryStore::new();
    let first = Router::new(eager_table()).with_store(Arc::new(store.clone()));
    first.navigate("/news", NavigateOptions::push()).await.unwrap();

    // Same path, route renamed since the history was saved
    let renamed = RouteTable::from_routes([
        RouteDefinition::eager("/news", "headlines", "HeadlinesView").unwrap(),
    ])
    .unwrap();
    let second = Router::new(renamed).with_store(Arc::new(store));
    let view = second.resume().await.unwrap().unwrap();
    assert_eq!(view.route_name, "headlines");
}

#[tokio::test]
async fn test_back_at_oldest_entry_is_boundary() {
    let router = Router::new(eager_table());
    router.navigate("/", NavigateOptions::push()).await.unwrap();
    let before = router.current_view().unwrap();
    let generation = router.generation();
    let mut events = router.subscribe();

    let err = router.back().await.unwrap_err();

    assert!(matches!(err, NavigationError::AtBoundary(Direction::Back)));
    assert!(err.is_informational());
    assert!(Arc::ptr_eq(&before, &router.current_view().unwrap()));
    assert_eq!(router.generation(), generation);
    assert!(matches!(
        drain_events(&mut events).as_slice(),
        [RouterEvent::AtBoundary {
            direction: Direction::Back
        }]
    ));
}

#[tokio::test]
async fn test_back_carries_entry_state_and_query() {
    let router = Router::new(eager_table());
    router
        .navigate(
            "/news?symbol=AAPL",
            NavigateOptions::push().with_state(serde_json::json!({ "scroll": 320 })),
        )
        .await
        .unwrap();
    router.navigate("/", NavigateOptions::push()).await.unwrap();

    let view = router.back().await.unwrap();
    assert_eq!(view.route_name, "news");
    assert_eq!(view.query.as_deref(), Some("symbol=AAPL"));
    assert_eq!(view.state, Some(serde_json::json!({ "scroll": 320 })));
    assert_eq!(router.history().entries.len(), 2);
}

#[tokio::test]
async fn test_history_cap_drops_oldest() {
    let router = Router::new(eager_table()).with_settings(RouterSettings {
        max_history: 3,
        ..RouterSettings::default()
    });

    for path in ["/", "/news", "/analysis", "/trading"] {
        router.navigate(path, NavigateOptions::push()).await.unwrap();
    }

    assert_eq!(history_names(&router), vec!["news", "analysis", "trading"]);
    assert_eq!(router.history().cursor, Some(2));
}

// ============================================================================
// Base path
// ============================================================================

#[tokio::test]
async fn test_base_path_locations() {
    let router = Router::new(eager_table()).with_settings(RouterSettings {
        base_path: Some("/app".to_string()),
        ..RouterSettings::default()
    });

    let view = router
        .handle_location("/app/news?symbol=TSLA#latest", NavigateOptions::push())
        .await
        .unwrap();
    assert_eq!(view.path, "/news");
    assert_eq!(view.query.as_deref(), Some("symbol=TSLA"));

    let view = router
        .handle_location("/app", NavigateOptions::push())
        .await
        .unwrap();
    assert_eq!(view.route_name, "dashboard");

    let err = router
        .handle_location("/apple/news", NavigateOptions::push())
        .await
        .unwrap_err();
    assert!(matches!(err, NavigationError::OutsideBase(_)));
    assert_eq!(router.current_view().unwrap().route_name, "dashboard");

    assert_eq!(router.href("/news"), "/app/news");
    assert_eq!(router.href("/"), "/app");
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_history_saved_after_each_commit() {
    let store = MemoryHistoryStore::new();
    let router = Router::new(eager_table()).with_store(Arc::new(store.clone()));

    router.navigate("/", NavigateOptions::push()).await.unwrap();
    router.navigate("/news", NavigateOptions::push()).await.unwrap();
    router.navigate("/missing", NavigateOptions::push()).await.unwrap_err();
    router.back().await.unwrap();

    assert_eq!(store.save_count().await, 3);
    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved, router.history());
    assert_eq!(saved.cursor, Some(0));
}

#[tokio::test]
async fn test_resume_from_memory_store() {
    let store = MemoryHistoryStore::new();
    let first = Router::new(eager_table()).with_store(Arc::new(store.clone()));
    for path in ["/", "/news", "/trading"] {
        first.navigate(path, NavigateOptions::push()).await.unwrap();
    }
    first.back().await.unwrap();

    let second = Router::new(eager_table()).with_store(Arc::new(store.clone()));
    let view = second.resume().await.unwrap().unwrap();

    assert_eq!(view.route_name, "news");
    assert_eq!(history_names(&second), vec!["dashboard", "news", "trading"]);
    assert_eq!(second.forward().await.unwrap().route_name, "trading");
}

#[tokio::test]
async fn test_resume_without_saved_history() {
    let router = Router::new(eager_table());
    assert!(router.resume().await.unwrap().is_none());

    let router = Router::new(eager_table()).with_store(Arc::new(MemoryHistoryStore::new()));
    assert!(!router.restore_history().await.unwrap());
    assert!(router.current_view().is_none());
}

#[tokio::test]
async fn test_resume_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let first = Router::new(eager_table()).with_store(Arc::new(FileHistoryStore::new(&path)));
    first.navigate("/", NavigateOptions::push()).await.unwrap();
    first
        .navigate("/backtester?strategy=momentum", NavigateOptions::push())
        .await
        .unwrap();
    assert!(path.exists());

    let second = Router::new(eager_table()).with_store(Arc::new(FileHistoryStore::new(&path)));
    let view = second.resume().await.unwrap().unwrap();
    assert_eq!(view.route_name, "backtester");
    assert_eq!(view.query.as_deref(), Some("strategy=momentum"));
    assert_eq!(second.back().await.unwrap().route_name, "dashboard");
}
