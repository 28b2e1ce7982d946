//! The per-family catalog of discovered devices.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::family::Family;
use crate::id::DeviceId;

/// Current per-family device listings.
///
/// Each family's slice is replaced wholesale on every discovery pass;
/// devices absent from the latest pass vanish from their family's slice.
/// No history is kept.
pub type Catalog = BTreeMap<Family, Vec<CatalogEntry>>;

/// One device's descriptive fields, tagged with its assigned hub id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// The hub identifier assigned to this device's address.
    pub id: DeviceId,
    /// Human-readable device name, when the family reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Network address the device was discovered at.
    pub ip: IpAddr,
    /// Hardware identifier (MAC or similar), when the family reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

/// Descriptive fields reported by a capability provider's `describe`
/// operation, before the hub tags them with an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Human-readable device name, when the family reports one.
    pub name: Option<String>,
    /// Network address of the device.
    pub ip: IpAddr,
    /// Hardware identifier, when the family reports one.
    pub mac: Option<String>,
}

impl Description {
    /// Tag this description with its assigned hub id.
    #[must_use]
    pub fn into_entry(self, id: DeviceId) -> CatalogEntry {
        CatalogEntry {
            id,
            name: self.name,
            ip: self.ip,
            mac: self.mac,
        }
    }
}
