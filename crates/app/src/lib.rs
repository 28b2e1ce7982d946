//! # casahub-app
//!
//! Application layer — the hub core and its **port definition**.
//!
//! ## Responsibilities
//! - Define the **port trait** adapters implement:
//!   [`ports::CapabilityProvider`] — discover/describe/status/execute for
//!   one device family
//! - The startup-validated [`table::CapabilityTable`]
//! - The [`registry::DeviceRegistry`] — identity assignment, handle
//!   storage, and the catalog, behind one coarse lock
//! - The [`discovery::DiscoveryEngine`] — one pass per enabled family,
//!   wholesale catalog rebuild
//! - The [`router::CommandRouter`] — validation and dispatch of
//!   status/control requests
//! - The [`autofind::Autofind`] background loop
//! - The [`hub::Hub`] context object wiring it all together
//!
//! ## Dependency rule
//! Depends on `casahub-domain` only (plus `tokio::sync`/`tokio::time` for
//! coordination). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod autofind;
pub mod discovery;
pub mod hub;
pub mod ports;
pub mod registry;
pub mod router;
pub mod table;
