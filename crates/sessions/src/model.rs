use std::{collections::BTreeMap, sync::Arc};

use {
    chrono::{DateTime, Utc},
    image::DynamicImage,
    serde::{Deserialize, Serialize, Serializer},
    serde_json::Value,
};

/// A single observed value of a vehicle, connector or plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: None,
            enabled: true,
            last_updated: None,
            last_changed: None,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn updated_at(mut self, ts: DateTime<Utc>) -> Self {
        self.last_updated = Some(ts);
        self
    }

    #[must_use]
    pub fn changed_at(mut self, ts: DateTime<Utc>) -> Self {
        self.last_changed = Some(ts);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vehicle {
    /// Vehicle identification number.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Named pictures of the vehicle. Only the names are serialized.
    #[serde(
        default,
        skip_deserializing,
        serialize_with = "serialize_image_names"
    )]
    pub images: BTreeMap<String, Arc<DynamicImage>>,
}

fn serialize_image_names<S: Serializer>(
    images: &BTreeMap<String, Arc<DynamicImage>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(images.keys())
}

impl Vehicle {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Display name: the configured name, falling back to the model and then
    /// the VIN.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.model.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn image(&self, name: &str) -> Option<Arc<DynamicImage>> {
        self.images.get(name).cloned()
    }
}

/// Ordered collection of vehicles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Garage {
    pub vehicles: Vec<Vehicle>,
}

impl Garage {
    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
