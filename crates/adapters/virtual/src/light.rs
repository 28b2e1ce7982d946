//! Simulated smart bulbs (family `wizlight`).
//!
//! Deliberately a status-only provider: `execute` is left at its default,
//! so every control request for this family is rejected with
//! `UnsupportedCommand`. This mirrors a family whose protocol adapter
//! implements discovery and telemetry but no control path.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use casahub_app::ports::{CapabilityProvider, NativeHandle};
use casahub_domain::catalog::Description;
use casahub_domain::error::HubError;
use casahub_domain::family::Family;

/// One simulated bulb. The handle type this provider hands to the hub.
struct VirtualBulb {
    ip: IpAddr,
    mac: String,
    on: bool,
    brightness: u8,
    colour_temp: u16,
    rgb: [u8; 3],
}

/// Capability provider simulating a set of `wizlight` bulbs.
pub struct VirtualLightProvider {
    bulbs: Vec<Arc<VirtualBulb>>,
    fail_discovery: AtomicBool,
}

impl Default for VirtualLightProvider {
    fn default() -> Self {
        Self {
            bulbs: vec![Arc::new(VirtualBulb {
                ip: IpAddr::from([192, 0, 2, 20]),
                mac: "A8:BB:50:00:00:14".to_string(),
                on: true,
                brightness: 191,
                colour_temp: 2700,
                rgb: [255, 166, 87],
            })],
            fail_discovery: AtomicBool::new(false),
        }
    }
}

impl VirtualLightProvider {
    /// Make every discovery fail (or succeed again) from now on.
    pub fn set_discovery_failure(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::SeqCst);
    }

    fn bulb<'a>(
        &self,
        handle: &'a NativeHandle,
        reason_for: fn(Family, String) -> HubError,
    ) -> Result<&'a VirtualBulb, HubError> {
        handle.downcast_ref::<VirtualBulb>().ok_or_else(|| {
            reason_for(
                Family::WizLight,
                "handle does not belong to the wizlight family".to_string(),
            )
        })
    }
}

#[async_trait]
impl CapabilityProvider for VirtualLightProvider {
    fn family(&self) -> Family {
        Family::WizLight
    }

    async fn discover(
        &self,
        _broadcast: Ipv4Addr,
    ) -> Result<HashMap<IpAddr, NativeHandle>, HubError> {
        if self.fail_discovery.load(Ordering::SeqCst) {
            return Err(HubError::Discovery {
                family: Family::WizLight,
                reason: "simulated network failure".to_string(),
            });
        }
        Ok(self
            .bulbs
            .iter()
            .map(|bulb| (bulb.ip, Arc::clone(bulb) as NativeHandle))
            .collect())
    }

    async fn describe(&self, handle: &NativeHandle) -> Result<Description, HubError> {
        let bulb = self.bulb(handle, |family, reason| HubError::Describe {
            family,
            reason,
        })?;
        Ok(Description {
            name: None,
            ip: bulb.ip,
            mac: Some(bulb.mac.clone()),
        })
    }

    async fn status(&self, handle: &NativeHandle) -> Result<serde_json::Value, HubError> {
        let bulb = self.bulb(handle, |family, reason| HubError::Status { family, reason })?;
        let status = if bulb.on { "ON" } else { "OFF" };
        Ok(serde_json::json!({
            "status": status,
            "brightness": f64::from(bulb.brightness) / 255.0,
            "colour_preset": bulb.colour_temp,
            "colour": {
                "r": bulb.rgb[0],
                "g": bulb.rgb[1],
                "b": bulb.rgb[2],
            },
        }))
    }
}
