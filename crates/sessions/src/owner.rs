//! Connectors and plugins registered with the aggregator.

use {
    autodash_plugins::ProvidesUi,
    serde::{Deserialize, Serialize},
};

use crate::model::Attribute;

/// A data source talking to a vehicle manufacturer's backend.
pub trait Connector: ProvidesUi + Send + Sync {
    fn id(&self) -> &str;

    /// Implementation type, e.g. `autodash-connector-volkswagen`.
    fn connector_type(&self) -> &str;

    fn version(&self) -> &str;

    fn is_healthy(&self) -> bool {
        true
    }

    /// Free-form status values shown on the connectors page.
    fn status(&self) -> Vec<Attribute> {
        Vec::new()
    }
}

/// An add-on consuming the aggregated state, e.g. this dashboard.
pub trait Plugin: ProvidesUi + Send + Sync {
    fn id(&self) -> &str;

    fn plugin_type(&self) -> &str;

    fn version(&self) -> &str;

    fn is_healthy(&self) -> bool {
        true
    }

    fn status(&self) -> Vec<Attribute> {
        Vec::new()
    }
}

/// Plain description of a connector or plugin without a UI of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_healthy")]
    pub healthy: bool,
    #[serde(default)]
    pub status: Vec<Attribute>,
}

fn default_healthy() -> bool {
    true
}

impl OwnerRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            version: version.into(),
            healthy: true,
            status: Vec::new(),
        }
    }

    #[must_use]
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }
}

impl ProvidesUi for OwnerRecord {}

impl Connector for OwnerRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn connector_type(&self) -> &str {
        &self.kind
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn status(&self) -> Vec<Attribute> {
        self.status.clone()
    }
}

impl Plugin for OwnerRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn plugin_type(&self) -> &str {
        &self.kind
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn status(&self) -> Vec<Attribute> {
        self.status.clone()
    }
}
