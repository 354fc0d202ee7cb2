//! Opaque view handles and the providers that produce them

use crate::error::ModuleLoadError;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Handle to a loaded view module
///
/// The router never looks inside a view. It only passes the handle on to the
/// rendering layer, so a handle is just the module identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewHandle(Arc<str>);

impl ViewHandle {
    pub fn new(module: impl Into<Arc<str>>) -> Self {
        Self(module.into())
    }

    /// The view module identifier, e.g. `"NewsView"`
    pub fn module(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewHandle {
    fn from(module: &str) -> Self {
        Self::new(module)
    }
}

impl PartialEq<&str> for ViewHandle {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Deferred supplier of a view module
#[async_trait]
pub trait ViewLoader: Send + Sync {
    /// Obtain the view module
    async fn load(&self) -> Result<ViewHandle, ModuleLoadError>;
}

/// Adapts an async closure into a [`ViewLoader`]
pub struct FnLoader<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> ViewLoader for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<ViewHandle, ModuleLoadError>> + Send,
{
    async fn load(&self) -> Result<ViewHandle, ModuleLoadError> {
        (self.f)().await
    }
}

/// How a route obtains its view
#[derive(Clone)]
pub enum ViewProvider {
    /// The view is already resolved
    Eager(ViewHandle),
    /// The view is loaded on first navigation and cached for the session
    Lazy(Arc<dyn ViewLoader>),
}

impl ViewProvider {
    pub fn eager(handle: impl Into<ViewHandle>) -> Self {
        ViewProvider::Eager(handle.into())
    }

    /// Lazy provider from an async closure
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::{ViewHandle, ViewProvider};
    ///
    /// let provider = ViewProvider::lazy(|| async { Ok(ViewHandle::new("NewsView")) });
    /// assert!(provider.is_lazy());
    /// ```
    pub fn lazy<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewHandle, ModuleLoadError>> + Send + 'static,
    {
        ViewProvider::Lazy(Arc::new(FnLoader { f }))
    }

    /// Lazy provider backed by a custom loader
    pub fn from_loader(loader: impl ViewLoader + 'static) -> Self {
        ViewProvider::Lazy(Arc::new(loader))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, ViewProvider::Lazy(_))
    }
}

impl fmt::Debug for ViewProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewProvider::Eager(handle) => f.debug_tuple("Eager").field(handle).finish(),
            ViewProvider::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Load state of a single view, as seen by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed,
}
