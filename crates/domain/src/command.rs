//! Commands — the tagged actions a device can be asked to perform.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HubError;

/// The kinds of command the hub understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Turn a device on or off.
    Switch,
    /// Change a light's colour.
    Colour,
}

impl CommandKind {
    /// Every command kind, in declaration order.
    pub const ALL: [Self; 2] = [Self::Switch, Self::Colour];

    /// Wire name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Colour => "colour",
        }
    }

    /// Parameters a request must carry for this kind.
    ///
    /// Parameters beyond these are tolerated, not rejected.
    #[must_use]
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::Switch => &["state"],
            Self::Colour => &["rgb"],
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CommandKind`] from text.
#[derive(Debug, thiserror::Error)]
#[error("unknown command kind '{0}'")]
pub struct UnknownCommandKindError(pub String);

impl FromStr for CommandKind {
    type Err = UnknownCommandKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownCommandKindError(s.to_string()))
    }
}

/// A fully-validated command, ready for a capability provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Command {
    /// Turn the device on (`true`) or off (`false`).
    Switch { state: bool },
    /// Set the device colour as an RGB triple.
    Colour { rgb: [u8; 3] },
}

impl Command {
    /// The kind of this command.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Switch { .. } => CommandKind::Switch,
            Self::Colour { .. } => CommandKind::Colour,
        }
    }

    /// Build a command of the given kind from a JSON parameter map.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MissingParameter`] when a required parameter is
    /// absent or has the wrong shape.
    pub fn from_params(kind: CommandKind, params: &Map<String, Value>) -> Result<Self, HubError> {
        match kind {
            CommandKind::Switch => {
                let state = require(kind, params, "state")?
                    .as_bool()
                    .ok_or(HubError::MissingParameter { kind, name: "state" })?;
                Ok(Self::Switch { state })
            }
            CommandKind::Colour => {
                let rgb = require(kind, params, "rgb")?;
                let rgb = serde_json::from_value(rgb.clone())
                    .map_err(|_| HubError::MissingParameter { kind, name: "rgb" })?;
                Ok(Self::Colour { rgb })
            }
        }
    }
}

fn require<'a>(
    kind: CommandKind,
    params: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Value, HubError> {
    params
        .get(name)
        .ok_or(HubError::MissingParameter { kind, name })
}
