//! The capability table — family → provider, validated at construction.

use std::collections::HashMap;
use std::sync::Arc;

use casahub_domain::family::Family;

use crate::ports::CapabilityProvider;

/// Startup-validated registry of capability providers.
///
/// Built once from the registered providers plus the enabled-family
/// configuration. Every enabled family must have a provider, which turns
/// a missing family into a construction error rather than a runtime
/// lookup miss.
pub struct CapabilityTable {
    providers: HashMap<Family, Arc<dyn CapabilityProvider>>,
    enabled: Vec<Family>,
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("families", &self.providers.keys().collect::<Vec<_>>())
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Errors raised while building a [`CapabilityTable`].
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A family was enabled in configuration without a registered provider.
    #[error("family '{0}' is enabled but has no capability provider")]
    MissingProvider(Family),
    /// Two providers were registered for the same family.
    #[error("duplicate capability provider for family '{0}'")]
    DuplicateProvider(Family),
}

/// Collects providers before validation.
#[derive(Default)]
pub struct CapabilityTableBuilder {
    providers: Vec<Arc<dyn CapabilityProvider>>,
}

impl CapabilityTableBuilder {
    /// Register one family's provider.
    #[must_use]
    pub fn register(mut self, provider: Arc<dyn CapabilityProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Validate and build the table.
    ///
    /// `enabled` keeps its declaration order (duplicates collapse onto the
    /// first occurrence); discovery passes iterate families in that order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateProvider`] when two providers claim
    /// the same family, and [`TableError::MissingProvider`] when an
    /// enabled family has none.
    pub fn build(self, enabled: &[Family]) -> Result<CapabilityTable, TableError> {
        let mut providers = HashMap::new();
        for provider in self.providers {
            let family = provider.family();
            if providers.insert(family, provider).is_some() {
                return Err(TableError::DuplicateProvider(family));
            }
        }

        let mut ordered = Vec::new();
        for &family in enabled {
            if !providers.contains_key(&family) {
                return Err(TableError::MissingProvider(family));
            }
            if !ordered.contains(&family) {
                ordered.push(family);
            }
        }

        Ok(CapabilityTable {
            providers,
            enabled: ordered,
        })
    }
}

impl CapabilityTable {
    /// Start building a table.
    #[must_use]
    pub fn builder() -> CapabilityTableBuilder {
        CapabilityTableBuilder::default()
    }

    /// Enabled families, in declaration order.
    #[must_use]
    pub fn enabled(&self) -> &[Family] {
        &self.enabled
    }

    /// Whether the family is enabled.
    #[must_use]
    pub fn is_enabled(&self, family: Family) -> bool {
        self.enabled.contains(&family)
    }

    /// Look up the provider for a family.
    ///
    /// `None` only for families that were never registered; construction
    /// guarantees every enabled family resolves.
    #[must_use]
    pub fn provider(&self, family: Family) -> Option<&Arc<dyn CapabilityProvider>> {
        self.providers.get(&family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    use async_trait::async_trait;
    use casahub_domain::catalog::Description;
    use casahub_domain::error::HubError;

    use crate::ports::NativeHandle;

    struct NoopProvider(Family);

    #[async_trait]
    impl CapabilityProvider for NoopProvider {
        fn family(&self) -> Family {
            self.0
        }

        async fn discover(
            &self,
            _broadcast: Ipv4Addr,
        ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
            Ok(HashMap::new())
        }

        async fn describe(&self, _handle: &NativeHandle) -> Result<Description, HubError> {
            Err(HubError::Describe {
                family: self.0,
                reason: "noop".to_string(),
            })
        }

        async fn status(&self, _handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn should_build_when_every_enabled_family_has_a_provider() {
        let table = CapabilityTable::builder()
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .register(Arc::new(NoopProvider(Family::WizLight)))
            .build(&[Family::WizLight, Family::KasaPlug])
            .unwrap();

        assert_eq!(table.enabled(), &[Family::WizLight, Family::KasaPlug]);
        assert!(table.provider(Family::KasaPlug).is_some());
    }

    #[test]
    fn should_fail_when_enabled_family_has_no_provider() {
        let err = CapabilityTable::builder()
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .build(&[Family::KasaPlug, Family::WizLight])
            .unwrap_err();

        assert!(matches!(err, TableError::MissingProvider(Family::WizLight)));
    }

    #[test]
    fn should_fail_when_two_providers_claim_the_same_family() {
        let err = CapabilityTable::builder()
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .build(&[Family::KasaPlug])
            .unwrap_err();

        assert!(matches!(err, TableError::DuplicateProvider(Family::KasaPlug)));
    }

    #[test]
    fn should_allow_registered_but_disabled_families() {
        let table = CapabilityTable::builder()
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .register(Arc::new(NoopProvider(Family::WizLight)))
            .build(&[Family::KasaPlug])
            .unwrap();

        assert!(table.is_enabled(Family::KasaPlug));
        assert!(!table.is_enabled(Family::WizLight));
    }

    #[test]
    fn should_collapse_duplicate_enabled_entries() {
        let table = CapabilityTable::builder()
            .register(Arc::new(NoopProvider(Family::KasaPlug)))
            .build(&[Family::KasaPlug, Family::KasaPlug])
            .unwrap();

        assert_eq!(table.enabled(), &[Family::KasaPlug]);
    }
}
