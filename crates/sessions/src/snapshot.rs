//! JSON snapshot used to seed a [`MemorySessionStore`].
//!
//! Image paths are resolved relative to the snapshot file.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use {serde::Deserialize, tracing::debug};

use crate::{
    error::{Context, Result},
    model::Vehicle,
    owner::OwnerRecord,
    store::MemorySessionStore,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleSnapshot {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    /// Image name → file path.
    #[serde(default)]
    pub images: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub vehicles: Vec<VehicleSnapshot>,
    #[serde(default)]
    pub connectors: Vec<OwnerRecord>,
    #[serde(default)]
    pub plugins: Vec<OwnerRecord>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Populate `store` with everything in this snapshot. Relative image
    /// paths are joined onto `base_dir`.
    pub fn apply(self, store: &MemorySessionStore, base_dir: &Path) -> Result<()> {
        for snapshot in self.vehicles {
            let mut vehicle = snapshot.vehicle;
            for (name, path) in snapshot.images {
                let path = if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                };
                let image = image::open(&path)?;
                debug!(vin = %vehicle.id, image = %name, path = %path.display(), "loaded vehicle image");
                vehicle.images.insert(name, Arc::new(image));
            }
            store.upsert_vehicle(vehicle);
        }
        for connector in self.connectors {
            store.add_connector(Arc::new(connector));
        }
        for plugin in self.plugins {
            store.add_plugin(Arc::new(plugin));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use image::DynamicImage;

    use super::*;
    use crate::store::SessionStore;

    #[test]
    fn parses_vehicles_and_owners() {
        let snapshot = Snapshot::from_json(
            r#"{
                "version": "0.7.2",
                "vehicles": [
                    {"id": "VIN1", "model": "ID.3", "attributes": [
                        {"name": "soc", "value": 80, "unit": "%"}
                    ]}
                ],
                "connectors": [{"id": "vw", "type": "connector-volkswagen", "version": "0.5"}],
                "plugins": [{"id": "mqtt", "type": "plugin-mqtt", "healthy": false}]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.version.as_deref(), Some("0.7.2"));
        assert_eq!(snapshot.vehicles[0].vehicle.model.as_deref(), Some("ID.3"));
        assert!(!snapshot.plugins[0].healthy);

        let store = MemorySessionStore::new("0.7.2");
        snapshot.apply(&store, Path::new(".")).unwrap();
        assert_eq!(store.garage().len(), 1);
        assert_eq!(store.connectors().len(), 1);
        assert!(!store.is_healthy());
    }

    #[test]
    fn loads_images_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        DynamicImage::new_rgb8(3, 2)
            .save(dir.path().join("car.png"))
            .unwrap();

        let snapshot = Snapshot::from_json(
            r#"{"vehicles": [{"id": "VIN1", "images": {"car": "car.png"}}]}"#,
        )
        .unwrap();
        let store = MemorySessionStore::new("1");
        snapshot.apply(&store, dir.path()).unwrap();

        assert_eq!(store.vehicle_image("VIN1", "car").unwrap().height(), 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Snapshot::load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snapshot.json"));
    }
}
