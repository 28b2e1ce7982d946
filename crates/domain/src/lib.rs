//! # casahub-domain
//!
//! Pure domain model for the casahub device hub.
//!
//! ## Responsibilities
//! - Process-stable device identifiers ([`id::DeviceId`])
//! - Device families and their command declarations ([`family::Family`])
//! - Commands, command kinds, and parameter validation ([`command`])
//! - The per-family catalog of discovered devices ([`catalog`])
//! - The hub error taxonomy ([`error::HubError`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! It must never import anything from `app`, adapters, or external IO
//! crates. All IO boundaries are expressed as traits in the `app` crate
//! (ports).

pub mod catalog;
pub mod command;
pub mod error;
pub mod family;
pub mod id;
