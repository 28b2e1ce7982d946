//! Device families and their command declarations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;

/// A category of device sharing one discovery/control protocol.
///
/// A family is *supported* when the hub's capability table has a provider
/// for it, and *enabled* when named in configuration; only families that
/// are both take part in discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Family {
    /// TP-Link Kasa smart plugs.
    #[serde(rename = "kasaplug")]
    KasaPlug,
    /// WiZ smart light bulbs.
    #[serde(rename = "wizlight")]
    WizLight,
}

impl Family {
    /// Every family, in declaration order.
    pub const ALL: [Self; 2] = [Self::KasaPlug, Self::WizLight];

    /// Wire name of the family.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KasaPlug => "kasaplug",
            Self::WizLight => "wizlight",
        }
    }

    /// Command kinds this family claims to handle.
    ///
    /// A static declaration, checked by the command router before a
    /// command is ever forwarded to the family's provider. Independent of
    /// whether the provider actually implements `execute`.
    #[must_use]
    pub fn commands(self) -> &'static [CommandKind] {
        match self {
            Self::KasaPlug => &[CommandKind::Switch],
            Self::WizLight => &[CommandKind::Colour],
        }
    }

    /// Whether this family declares the given command kind.
    #[must_use]
    pub fn supports(self, kind: CommandKind) -> bool {
        self.commands().contains(&kind)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Family`] from text.
#[derive(Debug, thiserror::Error)]
#[error("unknown device family '{0}'")]
pub struct UnknownFamilyError(pub String);

impl FromStr for Family {
    type Err = UnknownFamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| UnknownFamilyError(s.to_string()))
    }
}
