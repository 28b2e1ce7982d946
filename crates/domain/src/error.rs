//! The hub error taxonomy.
//!
//! Discovery and describe failures are contained to the family or entry
//! they occurred in; status and execution failures always reach the
//! caller. No operation is retried by the hub core — retry policy, if
//! any, belongs to the capability provider.

use crate::command::CommandKind;
use crate::family::Family;

/// Errors surfaced by hub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A family's discovery call failed or timed out.
    #[error("discovery failed for family '{family}': {reason}")]
    Discovery { family: Family, reason: String },

    /// A provider could not describe a discovered device.
    #[error("could not describe device for family '{family}': {reason}")]
    Describe { family: Family, reason: String },

    /// A provider could not report a device's status.
    #[error("status query failed for family '{family}': {reason}")]
    Status { family: Family, reason: String },

    /// The referenced identifier is unknown to the registry.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The family does not handle this command kind.
    #[error("family '{family}' does not support command '{kind}'")]
    UnsupportedCommand { family: Family, kind: CommandKind },

    /// A required command parameter is absent or malformed.
    #[error("missing or invalid parameter '{name}' for command '{kind}'")]
    MissingParameter { kind: CommandKind, name: &'static str },

    /// The device rejected or failed the command.
    #[error("execution failed: {reason}")]
    Execution { reason: String },
}

/// An identifier with no registry entry behind it.
#[derive(Debug, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    /// What was looked up (e.g. `"Device"`).
    pub entity: &'static str,
    /// The identifier that missed.
    pub id: String,
}
