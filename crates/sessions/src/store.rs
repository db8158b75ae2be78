use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use image::DynamicImage;

use crate::{
    logs::{LogBuffer, LogRecord},
    model::{Garage, Vehicle},
    owner::{Connector, Plugin},
};

/// Read-only view of the aggregator state.
///
/// Implementations synchronize internally; every method returns a snapshot
/// that stays valid after the call.
pub trait SessionStore: Send + Sync {
    /// Version of the aggregator owning this store.
    fn version(&self) -> String;

    /// `true` when every connector and plugin reports healthy.
    fn is_healthy(&self) -> bool;

    fn garage(&self) -> Garage;

    fn vehicle(&self, id: &str) -> Option<Vehicle>;

    fn vehicle_image(&self, id: &str, image: &str) -> Option<Arc<DynamicImage>>;

    /// Connectors in the order they were registered.
    fn connectors(&self) -> Vec<Arc<dyn Connector>>;

    /// Plugins in the order they were registered.
    fn plugins(&self) -> Vec<Arc<dyn Plugin>>;

    fn log_records(&self) -> Vec<LogRecord>;
}

#[derive(Default)]
struct Inner {
    vehicles: Vec<Vehicle>,
    connectors: Vec<Arc<dyn Connector>>,
    plugins: Vec<Arc<dyn Plugin>>,
}

/// In-process [`SessionStore`] guarded by a `RwLock`.
pub struct MemorySessionStore {
    version: String,
    inner: RwLock<Inner>,
    logs: LogBuffer,
}

impl MemorySessionStore {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            inner: RwLock::new(Inner::default()),
            logs: LogBuffer::default(),
        }
    }

    /// Use `logs` as the store's log storage, typically the buffer fed by a
    /// [`crate::LogCaptureLayer`].
    #[must_use]
    pub fn with_log_buffer(mut self, logs: LogBuffer) -> Self {
        self.logs = logs;
        self
    }

    pub fn log_buffer(&self) -> &LogBuffer {
        &self.logs
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert a vehicle, replacing one with the same id in place.
    pub fn upsert_vehicle(&self, vehicle: Vehicle) {
        let mut inner = self.write();
        match inner.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            Some(existing) => *existing = vehicle,
            None => inner.vehicles.push(vehicle),
        }
    }

    pub fn remove_vehicle(&self, id: &str) -> Option<Vehicle> {
        let mut inner = self.write();
        let pos = inner.vehicles.iter().position(|v| v.id == id)?;
        Some(inner.vehicles.remove(pos))
    }

    /// Attach a named picture to a vehicle. Returns `false` for unknown ids.
    pub fn set_vehicle_image(&self, id: &str, name: impl Into<String>, image: DynamicImage) -> bool {
        let mut inner = self.write();
        match inner.vehicles.iter_mut().find(|v| v.id == id) {
            Some(vehicle) => {
                vehicle.images.insert(name.into(), Arc::new(image));
                true
            },
            None => false,
        }
    }

    pub fn add_connector(&self, connector: Arc<dyn Connector>) {
        self.write().connectors.push(connector);
    }

    pub fn add_plugin(&self, plugin: Arc<dyn Plugin>) {
        self.write().plugins.push(plugin);
    }
}

impl SessionStore for MemorySessionStore {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn is_healthy(&self) -> bool {
        let inner = self.read();
        inner.connectors.iter().all(|c| c.is_healthy())
            && inner.plugins.iter().all(|p| p.is_healthy())
    }

    fn garage(&self) -> Garage {
        Garage {
            vehicles: self.read().vehicles.clone(),
        }
    }

    fn vehicle(&self, id: &str) -> Option<Vehicle> {
        self.read().vehicles.iter().find(|v| v.id == id).cloned()
    }

    fn vehicle_image(&self, id: &str, image: &str) -> Option<Arc<DynamicImage>> {
        self.read()
            .vehicles
            .iter()
            .find(|v| v.id == id)
            .and_then(|v| v.image(image))
    }

    fn connectors(&self) -> Vec<Arc<dyn Connector>> {
        self.read().connectors.clone()
    }

    fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.read().plugins.clone()
    }

    fn log_records(&self) -> Vec<LogRecord> {
        self.logs.records()
    }
}
