//! Capability port — the contract one device family plugs into the hub
//! with.
//!
//! A capability provider bridges a family's native wire protocol
//! (Kasa UDP, WiZ UDP, …) into the hub. The hub never speaks a native
//! protocol itself; it only calls the four operations below and stores
//! the opaque handles they hand back.

use std::any::Any;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use async_trait::async_trait;

use casahub_domain::catalog::Description;
use casahub_domain::command::Command;
use casahub_domain::error::HubError;
use casahub_domain::family::Family;

/// Opaque native reference to one discovered device.
///
/// Owned by the registry and replaced on every discovery pass. The owning
/// family's provider downcasts it to its concrete device type for the
/// duration of a single call and must not retain it beyond that call.
pub type NativeHandle = Arc<dyn Any + Send + Sync>;

/// The four operations a device family exposes to the hub.
///
/// One implementation per [`Family`], registered in the
/// [`CapabilityTable`](crate::table::CapabilityTable) at startup.
/// `discover`, `describe`, and `status` are mandatory. `execute` is
/// optional — the default implementation rejects every command with
/// [`HubError::UnsupportedCommand`], so a family without control support
/// fails visibly instead of silently doing nothing.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// The family this provider implements.
    fn family(&self) -> Family;

    /// Scan the broadcast domain and return native handles keyed by the
    /// address each device answered from.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Discovery`] on network or timeout failure.
    async fn discover(
        &self,
        broadcast: Ipv4Addr,
    ) -> Result<HashMap<IpAddr, NativeHandle>, HubError>;

    /// Report the descriptive fields for one discovered device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Describe`] when the device cannot be described.
    async fn describe(&self, handle: &NativeHandle) -> Result<Description, HubError>;

    /// Fetch a live, family-specific status snapshot for one device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Status`] when the device cannot be queried.
    async fn status(&self, handle: &NativeHandle) -> Result<serde_json::Value, HubError>;

    /// Execute a validated command against one device.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::UnsupportedCommand`] when the family has no
    /// control support for this command, or [`HubError::Execution`] when
    /// the device rejects or fails it.
    async fn execute(
        &self,
        _handle: &NativeHandle,
        command: &Command,
    ) -> Result<serde_json::Value, HubError> {
        Err(HubError::UnsupportedCommand {
            family: self.family(),
            kind: command.kind(),
        })
    }
}
