//! The hub context — one explicit object owning the runtime pieces.
//!
//! Constructed once at startup by the composition root and shared (via
//! `Arc`) with the request handlers; there are no module-level
//! singletons. Lifecycle is explicit: create, optionally start autofind,
//! and [`shutdown`](Hub::shutdown) on the way out.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use casahub_domain::catalog::Catalog;
use casahub_domain::command::CommandKind;
use casahub_domain::error::HubError;
use casahub_domain::id::DeviceId;

use crate::autofind::Autofind;
use crate::discovery::{DiscoveryEngine, PassReport};
use crate::registry::DeviceRegistry;
use crate::router::CommandRouter;
use crate::table::CapabilityTable;

/// Runtime settings for the hub core.
#[derive(Debug, Clone, Copy)]
pub struct HubConfig {
    /// Subnet broadcast address used for every family's discovery.
    pub broadcast: Ipv4Addr,
    /// Upper bound on each provider call (discover/describe/status/
    /// execute).
    pub call_timeout: Duration,
}

/// The assembled hub: registry, capability table, discovery engine,
/// command router, and the optional autofind loop.
pub struct Hub {
    registry: Arc<DeviceRegistry>,
    engine: Arc<DiscoveryEngine>,
    router: CommandRouter,
    autofind: Mutex<Option<Autofind>>,
}

impl Hub {
    /// Assemble the hub from a validated capability table.
    #[must_use]
    pub fn new(table: CapabilityTable, config: HubConfig) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        // Seed an empty slice per enabled family so the catalog lists
        // every actionable family from the start.
        for &family in table.enabled() {
            registry.replace_catalog(family, Vec::new());
        }
        let table = Arc::new(table);
        let engine = Arc::new(DiscoveryEngine::new(
            Arc::clone(&registry),
            Arc::clone(&table),
            config.broadcast,
            config.call_timeout,
        ));
        let router = CommandRouter::new(Arc::clone(&registry), table, config.call_timeout);
        Self {
            registry,
            engine,
            router,
            autofind: Mutex::new(None),
        }
    }

    /// Run one synchronous discovery pass over every enabled family.
    pub async fn refresh(&self) -> PassReport {
        self.engine.run_pass().await
    }

    /// Immutable copy of the current catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.registry.snapshot_catalog()
    }

    /// Live status snapshot for one device.
    ///
    /// # Errors
    ///
    /// See [`CommandRouter::status`].
    pub async fn status(&self, id: DeviceId) -> Result<Value, HubError> {
        self.router.status(id).await
    }

    /// Validate and execute a command against one device.
    ///
    /// # Errors
    ///
    /// See [`CommandRouter::dispatch`].
    pub async fn control(
        &self,
        id: DeviceId,
        kind: CommandKind,
        params: &Map<String, Value>,
    ) -> Result<Value, HubError> {
        self.router.dispatch(id, kind, params).await
    }

    /// Start background discovery, replacing any previous loop.
    pub async fn start_autofind(&self, interval: Duration) {
        let mut slot = self.autofind.lock().await;
        if let Some(previous) = slot.take() {
            previous.stop().await;
        }
        *slot = Some(Autofind::spawn(Arc::clone(&self.engine), interval));
    }

    /// Stop background discovery, waiting for any in-flight pass.
    ///
    /// Safe to call when autofind was never started.
    pub async fn shutdown(&self) {
        if let Some(autofind) = self.autofind.lock().await.take() {
            autofind.stop().await;
        }
    }
}
