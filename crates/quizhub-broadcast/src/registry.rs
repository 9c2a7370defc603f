//! Process-wide map from session code to its live hub.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use quizhub_core::session::SessionCode;

use crate::hub::{BroadcastHub, HubConfig};

/// Keeps at most one hub per session code.
#[derive(Debug)]
pub struct HubRegistry {
    config: HubConfig,
    hubs: RwLock<HashMap<SessionCode, Arc<BroadcastHub>>>,
}

impl Default for HubRegistry {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl HubRegistry {
    /// Creates an empty registry whose hubs use `config`.
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            hubs: RwLock::new(HashMap::new()),
        }
    }

    /// The configuration applied to every hub.
    #[must_use]
    pub fn config(&self) -> HubConfig {
        self.config
    }

    /// Returns the live hub for `code`, if any.
    pub async fn get(&self, code: SessionCode) -> Option<Arc<BroadcastHub>> {
        self.hubs.read().await.get(&code).cloned()
    }

    /// Returns the hub for `code`, creating it if none is registered.
    /// Concurrent callers for the same code always get the same hub.
    pub async fn get_or_create(&self, code: SessionCode) -> Arc<BroadcastHub> {
        if let Some(hub) = self.hubs.read().await.get(&code) {
            return Arc::clone(hub);
        }
        let mut hubs = self.hubs.write().await;
        let hub = hubs
            .entry(code)
            .or_insert_with(|| BroadcastHub::spawn(code, self.config));
        Arc::clone(hub)
    }

    /// Removes the hub for `code` and closes it. Returns `false` if there was
    /// none.
    pub async fn remove(&self, code: SessionCode) -> bool {
        let removed = self.hubs.write().await.remove(&code);
        match removed {
            Some(hub) => {
                hub.close().await;
                info!(%code, "hub torn down");
                true
            }
            None => false,
        }
    }

    /// Closes the hub currently registered for `code` once the teardown
    /// grace period has passed, and unregisters it if it is still the one
    /// registered then. A hub created for the code in the meantime is left
    /// alone. The caller does not wait.
    pub async fn schedule_teardown(self: &Arc<Self>, code: SessionCode) -> JoinHandle<()> {
        let hub = self.get(code).await;
        let registry = Arc::clone(self);
        let grace = self.config.teardown_grace;
        debug!(%code, ?grace, "hub teardown scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let Some(hub) = hub else { return };
            {
                let mut hubs = registry.hubs.write().await;
                if hubs.get(&code).is_some_and(|current| Arc::ptr_eq(current, &hub)) {
                    hubs.remove(&code);
                }
            }
            hub.close().await;
            info!(%code, "hub torn down");
        })
    }

    /// Unregisters the hub for `code` immediately, so the code can host a new
    /// session, and closes it once the teardown grace period has passed.
    /// Connections already on the hub keep receiving until then.
    pub async fn retire(&self, code: SessionCode) -> JoinHandle<()> {
        let hub = self.hubs.write().await.remove(&code);
        let grace = self.config.teardown_grace;
        debug!(%code, ?grace, "hub retired");
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if let Some(hub) = hub {
                hub.close().await;
                info!(%code, "retired hub closed");
            }
        })
    }

    /// Number of registered hubs.
    pub async fn hub_count(&self) -> usize {
        self.hubs.read().await.len()
    }

    /// Closes every hub. Used on process shutdown.
    pub async fn shutdown(&self) {
        let hubs: Vec<Arc<BroadcastHub>> = self.hubs.write().await.drain().map(|(_, h)| h).collect();
        for hub in &hubs {
            hub.close().await;
        }
        info!(count = hubs.len(), "all hubs closed");
    }
}
