//! # casahub-adapter-virtual
//!
//! Simulated capability providers for testing and demonstration. They
//! implement the same [`CapabilityProvider`](casahub_app::ports::CapabilityProvider)
//! contract a real wire-protocol adapter would, so the full hub stack can
//! be exercised end-to-end without hardware on the network.
//!
//! ## Provided families
//!
//! | Provider | Family | Behaviour |
//! |----------|--------|-----------|
//! | [`VirtualPlugProvider`] | `kasaplug` | Plugs with on/off state and simulated power readings; handles `switch` |
//! | [`VirtualLightProvider`] | `wizlight` | Bulbs with brightness/colour state; no `execute` — control requests are rejected |
//!
//! Both providers can be armed to fail discovery or execution, which the
//! end-to-end tests use to exercise the hub's failure containment.
//!
//! ## Dependency rule
//!
//! Depends on `casahub-app` (the port trait) and `casahub-domain` only.

mod light;
mod plug;

pub use light::VirtualLightProvider;
pub use plug::VirtualPlugProvider;
