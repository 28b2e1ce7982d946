//! # casahub-adapter-http-axum
//!
//! HTTP adapter — thin request/response glue between callers and the hub
//! context.
//!
//! ## Endpoints
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | GET | `/health` | liveness check |
//! | GET | `/refresh` | one synchronous discovery pass, returns the pass report |
//! | GET | `/catalog` | current per-family catalog |
//! | GET | `/status/{device_id}` | live status snapshot for one device |
//! | POST | `/control/{command_kind}/{device_id}` | validate and execute a command |
//!
//! ## Dependency rule
//!
//! Depends on `casahub-app` and `casahub-domain`. No hub logic lives
//! here: handlers parse the path, delegate to [`casahub_app::hub::Hub`],
//! and map [`HubError`](casahub_domain::error::HubError) onto status
//! codes.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
