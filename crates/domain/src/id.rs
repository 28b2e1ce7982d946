//! Process-stable device identifiers.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of random bytes backing a [`DeviceId`].
const ID_BYTES: usize = 7;

/// Opaque identifier assigned to a discovered device address.
///
/// Rendered as 14 uppercase hex characters. An id is drawn once per
/// distinct IP address and reused on every later discovery of that
/// address; it is not stable across process restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId([u8; ID_BYTES]);

impl DeviceId {
    /// Draw a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Access the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ID_BYTES] {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing a [`DeviceId`] from text.
#[derive(Debug, thiserror::Error)]
#[error("device id must be {} hex characters", ID_BYTES * 2)]
pub struct ParseDeviceIdError;

impl FromStr for DeviceId {
    type Err = ParseDeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ID_BYTES * 2 {
            return Err(ParseDeviceIdError);
        }
        let mut bytes = [0u8; ID_BYTES];
        for (slot, pair) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| ParseDeviceIdError)?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| ParseDeviceIdError)?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
