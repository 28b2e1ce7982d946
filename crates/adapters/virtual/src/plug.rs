//! Simulated smart plugs (family `kasaplug`).

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use casahub_app::ports::{CapabilityProvider, NativeHandle};
use casahub_domain::catalog::Description;
use casahub_domain::command::Command;
use casahub_domain::error::HubError;
use casahub_domain::family::Family;

/// One simulated plug. The handle type this provider hands to the hub.
struct VirtualPlug {
    name: String,
    ip: IpAddr,
    mac: String,
    on: AtomicBool,
    watts: f64,
}

impl VirtualPlug {
    fn status_json(&self) -> serde_json::Value {
        let on = self.on.load(Ordering::SeqCst);
        let status = if on { "ON" } else { "OFF" };
        let power_now = if on { self.watts } else { 0.0 };
        serde_json::json!({
            "status": status,
            "power_now": power_now,
            "power_today": 0.42,
        })
    }
}

/// Capability provider simulating a set of `kasaplug` devices.
///
/// Device state survives across discovery passes, like a real plug on
/// the network: handles returned by later passes point at the same
/// simulated device.
pub struct VirtualPlugProvider {
    plugs: Vec<Arc<VirtualPlug>>,
    fail_discovery: AtomicBool,
    fail_next_execute: AtomicBool,
}

impl Default for VirtualPlugProvider {
    fn default() -> Self {
        let plug = |name: &str, last: u8, watts| {
            Arc::new(VirtualPlug {
                name: name.to_string(),
                ip: IpAddr::from([192, 0, 2, last]),
                mac: format!("50:C7:BF:00:00:{last:02X}"),
                on: AtomicBool::new(false),
                watts,
            })
        };
        Self {
            plugs: vec![plug("Desk Plug", 10, 17.5), plug("Heater Plug", 11, 950.0)],
            fail_discovery: AtomicBool::new(false),
            fail_next_execute: AtomicBool::new(false),
        }
    }
}

impl VirtualPlugProvider {
    /// Make every discovery fail (or succeed again) from now on.
    pub fn set_discovery_failure(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::SeqCst);
    }

    /// Arm a one-shot execution failure: the next `execute` call fails
    /// with [`HubError::Execution`].
    pub fn arm_execute_failure(&self) {
        self.fail_next_execute.store(true, Ordering::SeqCst);
    }

    fn plug<'a>(&self, handle: &'a NativeHandle) -> Result<&'a VirtualPlug, HubError> {
        handle
            .downcast_ref::<VirtualPlug>()
            .ok_or_else(|| HubError::Execution {
                reason: "handle does not belong to the kasaplug family".to_string(),
            })
    }
}

#[async_trait]
impl CapabilityProvider for VirtualPlugProvider {
    fn family(&self) -> Family {
        Family::KasaPlug
    }

    async fn discover(
        &self,
        _broadcast: Ipv4Addr,
    ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
        if self.fail_discovery.load(Ordering::SeqCst) {
            return Err(HubError::Discovery {
                family: Family::KasaPlug,
                reason: "simulated network failure".to_string(),
            });
        }
        Ok(self
            .plugs
            .iter()
            .map(|plug| (plug.ip, Arc::clone(plug) as NativeHandle))
            .collect())
    }

    async fn describe(&self, handle: &NativeHandle) -> Result<Description, HubError> {
        let plug = self.plug(handle).map_err(|_| HubError::Describe {
            family: Family::KasaPlug,
            reason: "handle does not belong to the kasaplug family".to_string(),
        })?;
        Ok(Description {
            name: Some(plug.name.clone()),
            ip: plug.ip,
            mac: Some(plug.mac.clone()),
        })
    }

    async fn status(&self, handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
        let plug = self.plug(handle).map_err(|_| HubError::Status {
            family: Family::KasaPlug,
            reason: "handle does not belong to the kasaplug family".to_string(),
        })?;
        Ok(plug.status_json())
    }

    async fn execute(
        &self,
        handle: &NativeHandle,
        command: &Command,
    ) -> Result<serde_json::Value, HubError> {
        let plug = self.plug(handle)?;
        if self.fail_next_execute.swap(false, Ordering::SeqCst) {
            return Err(HubError::Execution {
                reason: "simulated device failure".to_string(),
            });
        }
        match command {
            Command::Switch { state } => {
                plug.on.store(*state, Ordering::SeqCst);
                Ok(plug.status_json())
            }
            other => Err(HubError::UnsupportedCommand {
                family: Family::KasaPlug,
                kind: other.kind(),
            }),
        }
    }
}
