//! The discovery engine — one pass per enabled family, catalog rebuild.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::timeout;

use casahub_domain::error::HubError;
use casahub_domain::family::Family;

use crate::registry::DeviceRegistry;
use crate::table::CapabilityTable;

/// Outcome of one family within a discovery pass.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FamilyOutcome {
    /// Discovery succeeded; the family's catalog slice was replaced.
    Found { devices: usize },
    /// Discovery failed; the family kept its previous catalog slice.
    Failed { error: String },
}

/// Report of one discovery pass.
#[derive(Debug, Serialize)]
pub struct PassReport {
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the whole pass.
    pub elapsed_ms: u64,
    /// Per-family outcome, keyed by wire name.
    pub families: BTreeMap<Family, FamilyOutcome>,
}

/// Runs discovery passes over every enabled family.
///
/// A pass rebuilds each family's catalog slice from scratch: devices
/// absent from the latest pass vanish from the catalog, while their
/// identity assignments stay in the registry and are reused if the
/// address reappears.
pub struct DiscoveryEngine {
    registry: Arc<DeviceRegistry>,
    table: Arc<CapabilityTable>,
    broadcast: Ipv4Addr,
    call_timeout: Duration,
    // Serializes whole passes so two concurrent refreshes cannot
    // interleave their work within a family.
    pass_gate: Mutex<()>,
}

impl DiscoveryEngine {
    /// Create an engine over the given registry and capability table.
    #[must_use]
    pub fn new(
        registry: Arc<DeviceRegistry>,
        table: Arc<CapabilityTable>,
        broadcast: Ipv4Addr,
        call_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            table,
            broadcast,
            call_timeout,
            pass_gate: Mutex::new(()),
        }
    }

    /// Run one full discovery pass over every enabled family, in
    /// enabled-declaration order.
    ///
    /// A family whose discovery fails keeps its previous catalog slice and
    /// is reported in the result; the pass continues with the remaining
    /// families. A concurrent caller waits for the in-flight pass to
    /// finish rather than interleaving with it.
    #[tracing::instrument(skip(self))]
    pub async fn run_pass(&self) -> PassReport {
        let _gate = self.pass_gate.lock().await;
        let started_at = Utc::now();
        let start = Instant::now();

        let mut families = BTreeMap::new();
        for &family in self.table.enabled() {
            let outcome = match self.discover_family(family).await {
                Ok(devices) => {
                    tracing::debug!(family = %family, devices, "family discovered");
                    FamilyOutcome::Found { devices }
                }
                Err(err) => {
                    tracing::warn!(
                        family = %family,
                        error = %err,
                        "discovery failed, keeping previous catalog slice"
                    );
                    FamilyOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            families.insert(family, outcome);
        }

        PassReport {
            started_at,
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            families,
        }
    }

    /// Discover one family and swap in its rebuilt catalog slice.
    async fn discover_family(&self, family: Family) -> Result<usize, HubError> {
        let provider = self
            .table
            .provider(family)
            .ok_or_else(|| HubError::Discovery {
                family,
                reason: "no capability provider registered".to_string(),
            })?;

        let found = timeout(self.call_timeout, provider.discover(self.broadcast))
            .await
            .map_err(|_| HubError::Discovery {
                family,
                reason: format!("timed out after {:?}", self.call_timeout),
            })??;

        let mut entries = Vec::with_capacity(found.len());
        for (ip, handle) in found {
            let id = self.registry.resolve_or_create(ip);
            self.registry.set_family(id, family);
            self.registry.put_handle(id, Arc::clone(&handle));

            match timeout(self.call_timeout, provider.describe(&handle)).await {
                Ok(Ok(description)) => entries.push(description.into_entry(id)),
                Ok(Err(err)) => {
                    tracing::warn!(
                        family = %family,
                        device = %id,
                        error = %err,
                        "describe failed, omitting catalog entry"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        family = %family,
                        device = %id,
                        "describe timed out, omitting catalog entry"
                    );
                }
            }
        }
        entries.sort_by_key(|entry| entry.ip);

        let devices = entries.len();
        self.registry.replace_catalog(family, entries);
        Ok(devices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use casahub_domain::catalog::Description;

    use crate::ports::{CapabilityProvider, NativeHandle};

    /// Provider returning a fixed set of addresses, with armable failures.
    struct ScriptedProvider {
        family: Family,
        addresses: Vec<IpAddr>,
        fail_discovery: AtomicBool,
        fail_describe: AtomicBool,
    }

    impl ScriptedProvider {
        fn new(family: Family, last_octets: &[u8]) -> Self {
            Self {
                family,
                addresses: last_octets
                    .iter()
                    .map(|&last| IpAddr::from([192, 0, 2, last]))
                    .collect(),
                fail_discovery: AtomicBool::new(false),
                fail_describe: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl CapabilityProvider for ScriptedProvider {
        fn family(&self) -> Family {
            self.family
        }

        async fn discover(
            &self,
            _broadcast: Ipv4Addr,
        ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
            if self.fail_discovery.load(Ordering::SeqCst) {
                return Err(HubError::Discovery {
                    family: self.family,
                    reason: "network unreachable".to_string(),
                });
            }
            Ok(self
                .addresses
                .iter()
                .map(|&ip| (ip, Arc::new(ip) as NativeHandle))
                .collect())
        }

        async fn describe(&self, handle: &NativeHandle) -> Result<Description, HubError> {
            if self.fail_describe.load(Ordering::SeqCst) {
                return Err(HubError::Describe {
                    family: self.family,
                    reason: "no reply".to_string(),
                });
            }
            let ip = *handle.downcast_ref::<IpAddr>().unwrap();
            Ok(Description {
                name: None,
                ip,
                mac: None,
            })
        }

        async fn status(&self, _handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
            Ok(serde_json::Value::Null)
        }
    }

    fn engine_with(
        providers: Vec<Arc<dyn CapabilityProvider>>,
        enabled: &[Family],
    ) -> DiscoveryEngine {
        let mut builder = CapabilityTable::builder();
        for provider in providers {
            builder = builder.register(provider);
        }
        DiscoveryEngine::new(
            Arc::new(DeviceRegistry::new()),
            Arc::new(builder.build(enabled).unwrap()),
            Ipv4Addr::new(255, 255, 255, 255),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn should_build_catalog_from_discovered_devices() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10, 11]));
        let engine = engine_with(vec![provider], &[Family::KasaPlug]);

        let report = engine.run_pass().await;

        assert!(matches!(
            report.families[&Family::KasaPlug],
            FamilyOutcome::Found { devices: 2 }
        ));
        let catalog = engine.registry.snapshot_catalog();
        assert_eq!(catalog[&Family::KasaPlug].len(), 2);
    }

    #[tokio::test]
    async fn should_reuse_ids_across_passes_for_same_address() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10]));
        let engine = engine_with(vec![provider], &[Family::KasaPlug]);

        engine.run_pass().await;
        let first = engine.registry.snapshot_catalog()[&Family::KasaPlug][0].id;
        engine.run_pass().await;
        let second = engine.registry.snapshot_catalog()[&Family::KasaPlug][0].id;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_continue_with_other_families_when_one_fails() {
        let plugs = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10]));
        let lights = Arc::new(ScriptedProvider::new(Family::WizLight, &[20]));
        plugs.fail_discovery.store(true, Ordering::SeqCst);
        let engine = engine_with(
            vec![plugs, lights],
            &[Family::KasaPlug, Family::WizLight],
        );

        let report = engine.run_pass().await;

        assert!(matches!(
            report.families[&Family::KasaPlug],
            FamilyOutcome::Failed { .. }
        ));
        assert!(matches!(
            report.families[&Family::WizLight],
            FamilyOutcome::Found { devices: 1 }
        ));
    }

    #[tokio::test]
    async fn should_keep_previous_slice_when_discovery_fails() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10]));
        let engine = engine_with(vec![Arc::clone(&provider) as _], &[Family::KasaPlug]);

        engine.run_pass().await;
        provider.fail_discovery.store(true, Ordering::SeqCst);
        engine.run_pass().await;

        assert_eq!(
            engine.registry.snapshot_catalog()[&Family::KasaPlug].len(),
            1
        );
    }

    #[tokio::test]
    async fn should_omit_entry_when_describe_fails_but_keep_handle() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10]));
        provider.fail_describe.store(true, Ordering::SeqCst);
        let engine = engine_with(vec![Arc::clone(&provider) as _], &[Family::KasaPlug]);

        let report = engine.run_pass().await;

        assert!(matches!(
            report.families[&Family::KasaPlug],
            FamilyOutcome::Found { devices: 0 }
        ));
        assert!(engine.registry.snapshot_catalog()[&Family::KasaPlug].is_empty());
        // The identity and handle were still registered.
        let ip = IpAddr::from([192, 0, 2, 10]);
        let id = engine.registry.resolve_or_create(ip);
        assert!(engine.registry.handle(id).is_ok());
    }

    #[tokio::test]
    async fn should_drop_devices_absent_from_latest_pass() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10, 11]));
        let engine = engine_with(vec![Arc::clone(&provider) as _], &[Family::KasaPlug]);

        engine.run_pass().await;
        // Second engine over the same registry, seeing one device fewer.
        let shrunk = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10]));
        let engine2 = DiscoveryEngine::new(
            Arc::clone(&engine.registry),
            Arc::new(
                CapabilityTable::builder()
                    .register(shrunk)
                    .build(&[Family::KasaPlug])
                    .unwrap(),
            ),
            Ipv4Addr::new(255, 255, 255, 255),
            Duration::from_secs(1),
        );
        engine2.run_pass().await;

        let catalog = engine.registry.snapshot_catalog();
        assert_eq!(catalog[&Family::KasaPlug].len(), 1);
        assert_eq!(catalog[&Family::KasaPlug][0].ip, IpAddr::from([192, 0, 2, 10]));
    }

    #[tokio::test]
    async fn should_not_duplicate_ids_when_passes_run_concurrently() {
        let provider = Arc::new(ScriptedProvider::new(Family::KasaPlug, &[10, 11, 12]));
        let engine = Arc::new(engine_with(vec![provider], &[Family::KasaPlug]));

        let a = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.run_pass().await }
        });
        let b = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.run_pass().await }
        });
        a.await.unwrap();
        b.await.unwrap();

        let catalog = engine.registry.snapshot_catalog();
        let slice = &catalog[&Family::KasaPlug];
        assert_eq!(slice.len(), 3);
        let mut ids: Vec<_> = slice.iter().map(|entry| entry.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn should_report_timeout_as_discovery_error() {
        struct HungProvider;

        #[async_trait]
        impl CapabilityProvider for HungProvider {
            fn family(&self) -> Family {
                Family::KasaPlug
            }

            async fn discover(
                &self,
                _broadcast: Ipv4Addr,
            ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(HashMap::new())
            }

            async fn describe(&self, _handle: &NativeHandle) -> Result<Description, HubError> {
                unreachable!("discovery never completes")
            }

            async fn status(&self, _handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
                unreachable!("discovery never completes")
            }
        }

        let engine = DiscoveryEngine::new(
            Arc::new(DeviceRegistry::new()),
            Arc::new(
                CapabilityTable::builder()
                    .register(Arc::new(HungProvider))
                    .build(&[Family::KasaPlug])
                    .unwrap(),
            ),
            Ipv4Addr::new(255, 255, 255, 255),
            Duration::from_millis(20),
        );

        let report = engine.run_pass().await;
        match &report.families[&Family::KasaPlug] {
            FamilyOutcome::Failed { error } => assert!(error.contains("timed out")),
            FamilyOutcome::Found { .. } => panic!("expected discovery to time out"),
        }
    }
}
