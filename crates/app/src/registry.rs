//! The device registry — identity assignment, handle storage, and the
//! catalog.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use casahub_domain::catalog::{Catalog, CatalogEntry};
use casahub_domain::error::{HubError, NotFoundError};
use casahub_domain::family::Family;
use casahub_domain::id::DeviceId;

use crate::ports::NativeHandle;

#[derive(Default)]
struct Inner {
    ids_by_ip: HashMap<IpAddr, DeviceId>,
    families: HashMap<DeviceId, Family>,
    handles: HashMap<DeviceId, NativeHandle>,
    catalog: Catalog,
}

/// The hub's single piece of shared mutable state.
///
/// Identity maps, handle storage, and the catalog live behind one coarse
/// lock: every mutation is mutually exclusive with every other mutation
/// and with reads that need a consistent view. No guard is ever held
/// across an await point.
#[derive(Default)]
pub struct DeviceRegistry {
    inner: RwLock<Inner>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the id assigned to `ip`, drawing a fresh one on first sight.
    ///
    /// For a given address the returned id is constant for the lifetime of
    /// the process, even though the handle behind it is replaced on every
    /// discovery pass. Fresh ids are re-drawn until they collide with no
    /// id already assigned to another address.
    pub fn resolve_or_create(&self, ip: IpAddr) -> DeviceId {
        let mut inner = self.write();
        if let Some(&id) = inner.ids_by_ip.get(&ip) {
            return id;
        }
        let id = loop {
            let candidate = DeviceId::random();
            if !inner.ids_by_ip.values().any(|&taken| taken == candidate) {
                break candidate;
            }
        };
        inner.ids_by_ip.insert(ip, id);
        id
    }

    /// Associate `id` with `family`, overwriting any prior association.
    ///
    /// Idempotent; in practice an id's family never changes after first
    /// assignment.
    pub fn set_family(&self, id: DeviceId, family: Family) {
        self.write().families.insert(id, family);
    }

    /// Store or replace the native handle for `id`.
    pub fn put_handle(&self, id: DeviceId, handle: NativeHandle) {
        self.write().handles.insert(id, handle);
    }

    /// Look up the current native handle for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the id is unknown.
    pub fn handle(&self, id: DeviceId) -> Result<NativeHandle, HubError> {
        self.read()
            .handles
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Look up the family associated with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when the id is unknown.
    pub fn family_of(&self, id: DeviceId) -> Result<Family, HubError> {
        self.read()
            .families
            .get(&id)
            .copied()
            .ok_or_else(|| not_found(id))
    }

    /// Immutable copy of the current catalog, safe for concurrent reads.
    #[must_use]
    pub fn snapshot_catalog(&self) -> Catalog {
        self.read().catalog.clone()
    }

    /// Atomically swap one family's catalog slice.
    ///
    /// Readers observe either the previous slice or `entries` in full,
    /// never a mixture.
    pub fn replace_catalog(&self, family: Family, entries: Vec<CatalogEntry>) {
        self.write().catalog.insert(family, entries);
    }
}

fn not_found(id: DeviceId) -> HubError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}
