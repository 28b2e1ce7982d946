//! Shared application state for axum handlers.

use std::sync::Arc;

use casahub_app::hub::Hub;

/// Application state shared across all axum handlers.
///
/// Just the hub context behind an `Arc`; cloning is cheap and the hub's
/// own locking makes concurrent handler access safe.
#[derive(Clone)]
pub struct AppState {
    /// The assembled hub context.
    pub hub: Arc<Hub>,
}

impl AppState {
    /// Wrap an assembled hub.
    #[must_use]
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}
