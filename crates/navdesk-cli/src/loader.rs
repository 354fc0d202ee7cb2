//! Simulated view loaders
//!
//! The CLI has no real view modules, so lazy routes get a loader that waits
//! `load_delay_ms` and hands back the configured module identifier.

use async_trait::async_trait;
use navdesk_router::{ModuleLoadError, RouteManifestEntry, ViewHandle, ViewLoader, ViewProvider};
use std::time::Duration;
use tracing::debug;

pub struct SimulatedLoader {
    module: String,
    delay_ms: u64,
    fail: bool,
}

#[async_trait]
impl ViewLoader for SimulatedLoader {
    async fn load(&self) -> Result<ViewHandle, ModuleLoadError> {
        debug!(module = %self.module, delay_ms = self.delay_ms, "simulated load");
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        if self.fail {
            return Err(ModuleLoadError::new(format!(
                "module {} could not be fetched",
                self.module
            )));
        }
        Ok(ViewHandle::new(self.module.as_str()))
    }
}

/// Provider for a manifest entry; routes named in `failing` always fail to load
pub fn provider_for(entry: &RouteManifestEntry, failing: &[String]) -> ViewProvider {
    let fail = failing.iter().any(|name| name == &entry.name);

    if !entry.lazy && !fail {
        return ViewProvider::eager(entry.view.as_str());
    }

    ViewProvider::from_loader(SimulatedLoader {
        module: entry.view.clone(),
        delay_ms: entry.load_delay_ms,
        fail,
    })
}
