//! # Navdesk Router
//!
//! View routing for a single-page trading dashboard:
//! - Exact paths (`/news`) and dynamic segments (`/analysis/:symbol`)
//! - Views bundled eagerly or loaded on first use, at most once per session
//! - Back/forward history with a cursor, truncation and a size cap
//! - Cancellation: a newer navigation always wins over one still loading
//! - Observers via `tokio::sync::broadcast` (terminal events and state transitions)
//! - Optional history persistence (memory or JSON file)
//!
//! ## Matching
//!
//! Paths are normalized first (trailing and doubled slashes, backslashes). A
//! literal route beats any pattern; among patterns the one with the fewest
//! dynamic segments wins. Equally specific matches are reported as
//! [`NavigationError::AmbiguousRoute`], never guessed.
//!
//! ## Example
//!
//! ```
//! use navdesk_router::{NavigateOptions, RouteDefinition, RouteTable, Router, ViewHandle, ViewProvider};
//!
//! # tokio_test_block(async {
//! let table = RouteTable::from_routes([
//!     RouteDefinition::eager("/", "dashboard", "DashboardView").unwrap(),
//!     RouteDefinition::new(
//!         "/news",
//!         "news",
//!         ViewProvider::lazy(|| async { Ok(ViewHandle::new("NewsView")) }),
//!     )
//!     .unwrap(),
//! ])
//! .unwrap();
//!
//! let router = Router::new(table);
//! let view = router.navigate("/news", NavigateOptions::push()).await.unwrap();
//! assert_eq!(view.view_handle, "NewsView");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod config;
mod error;
mod events;
mod history;
mod intent;
pub mod path;
pub mod route;
mod router;
pub mod store;
mod table;
mod view;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{
    default_routes, Config, HistoryBackend, HistorySettings, RouteManifestEntry, RouterSettings,
};
pub use error::{Direction, ModuleLoadError, NavigationError, TableError};
pub use events::{RouterEvent, RouterState, StateTransition};
pub use history::{
    HistorySnapshot, HistoryStack, NavigationEntry, PendingEntry, SnapshotError,
    DEFAULT_MAX_ENTRIES,
};
pub use intent::{NavigateOptions, NavigationIntent, NavigationTarget};
pub use path::{is_valid_path, normalize_path, split_location, Location};
pub use route::{PathPattern, RouteDefinition, RouteMatch, Segment};
pub use router::{ActiveView, Router};
pub use store::{FileHistoryStore, HistoryStore, MemoryHistoryStore};
pub use table::RouteTable;
pub use view::{FnLoader, LoadStatus, ViewHandle, ViewLoader, ViewProvider};
