//! The command router — validation and dispatch of status/control
//! requests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::timeout;

use casahub_domain::command::{Command, CommandKind};
use casahub_domain::error::HubError;
use casahub_domain::id::DeviceId;

use crate::registry::DeviceRegistry;
use crate::table::CapabilityTable;

/// Resolves a device's family and handle, validates the request, and
/// delegates to the family's capability provider.
pub struct CommandRouter {
    registry: Arc<DeviceRegistry>,
    table: Arc<CapabilityTable>,
    call_timeout: Duration,
}

impl CommandRouter {
    /// Create a router over the given registry and capability table.
    #[must_use]
    pub fn new(
        registry: Arc<DeviceRegistry>,
        table: Arc<CapabilityTable>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            table,
            call_timeout,
        }
    }

    /// Validate and execute a command against a device.
    ///
    /// Validation order: the device must be known, its family must declare
    /// the command kind (undeclared kinds are rejected before the provider
    /// is ever consulted), and the required parameters must be present.
    /// Provider failures propagate to the caller.
    ///
    /// # Errors
    ///
    /// [`HubError::NotFound`] for unknown ids,
    /// [`HubError::UnsupportedCommand`] for kinds the family does not
    /// declare or its provider does not implement,
    /// [`HubError::MissingParameter`] for absent or malformed parameters,
    /// and [`HubError::Execution`] when the device rejects or fails the
    /// command (including a timed-out call).
    #[tracing::instrument(skip(self, params))]
    pub async fn dispatch(
        &self,
        id: DeviceId,
        kind: CommandKind,
        params: &Map<String, Value>,
    ) -> Result<Value, HubError> {
        let family = self.registry.family_of(id)?;
        if !family.supports(kind) {
            return Err(HubError::UnsupportedCommand { family, kind });
        }
        let command = Command::from_params(kind, params)?;
        let handle = self.registry.handle(id)?;
        let provider = self
            .table
            .provider(family)
            .ok_or(HubError::UnsupportedCommand { family, kind })?;

        timeout(self.call_timeout, provider.execute(&handle, &command))
            .await
            .map_err(|_| HubError::Execution {
                reason: format!("timed out after {:?}", self.call_timeout),
            })?
    }

    /// Fetch a live status snapshot for a device.
    ///
    /// # Errors
    ///
    /// [`HubError::NotFound`] for unknown ids, [`HubError::Status`] when
    /// the provider fails or the call times out.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self, id: DeviceId) -> Result<Value, HubError> {
        let family = self.registry.family_of(id)?;
        let handle = self.registry.handle(id)?;
        let provider = self.table.provider(family).ok_or_else(|| HubError::Status {
            family,
            reason: "no capability provider registered".to_string(),
        })?;

        timeout(self.call_timeout, provider.status(&handle))
            .await
            .map_err(|_| HubError::Status {
                family,
                reason: format!("timed out after {:?}", self.call_timeout),
            })?
    }
}
