//! Mount table of the route dispatcher.
//!
//! Holds the fixed core endpoints plus one mount point per fragment route
//! prefix, and resolves logical endpoint names to concrete URLs.

use std::collections::{BTreeMap, HashMap};

use crate::{
    error::{Error, Result},
    fragment::{Endpoint, FragmentKind},
};

/// Logical names of the core endpoints.
pub mod endpoints {
    pub const GARAGE: &str = "garage.garage";
    pub const CONNECTORS_STATUS: &str = "connectors.status";
    pub const PLUGINS_STATUS: &str = "plugins.status";
    pub const LOG: &str = "log";
    pub const ABOUT: &str = "about";
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
}

/// Core endpoint name → path. The web router registers handlers at exactly
/// these paths.
pub const CORE_ENDPOINTS: &[(&str, &str)] = &[
    (endpoints::GARAGE, "/garage/"),
    (endpoints::CONNECTORS_STATUS, "/connectors/status"),
    (endpoints::PLUGINS_STATUS, "/plugins/status"),
    (endpoints::LOG, "/log"),
    (endpoints::ABOUT, "/about"),
    (endpoints::LOGIN, "/login"),
    (endpoints::LOGOUT, "/logout"),
];

/// Prefixes that would shadow core routes under `/plugins` or `/connectors`.
const RESERVED_PREFIXES: &[&str] = &["status"];

#[derive(Debug, Clone)]
struct MountPoint {
    owner_id: String,
    base: String,
    endpoints: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    core: HashMap<String, String>,
    mounts: HashMap<FragmentKind, BTreeMap<String, MountPoint>>,
}

impl RouteTable {
    /// An empty table without core endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table pre-populated with [`CORE_ENDPOINTS`].
    pub fn with_core_endpoints() -> Self {
        let mut table = Self::new();
        for (name, path) in CORE_ENDPOINTS {
            table.register_core(*name, *path);
        }
        table
    }

    pub fn register_core(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.core.insert(name.into(), path.into());
    }

    /// Mount a fragment's endpoints below `/<kind>s/<prefix>`.
    ///
    /// Returns the mount base path. A prefix can only be mounted once per
    /// kind.
    pub fn mount(
        &mut self,
        kind: FragmentKind,
        owner_id: &str,
        prefix: &str,
        endpoints: &[Endpoint],
    ) -> Result<String> {
        validate_prefix(kind, owner_id, prefix)?;

        let mounts = self.mounts.entry(kind).or_default();
        if let Some(existing) = mounts.get(prefix) {
            return Err(Error::DuplicateRoutePrefix {
                kind,
                prefix: prefix.to_owned(),
                existing: existing.owner_id.clone(),
                owner: owner_id.to_owned(),
            });
        }

        let mut resolved = HashMap::with_capacity(endpoints.len());
        for endpoint in endpoints {
            if !endpoint.path.starts_with('/') {
                return Err(Error::InvalidEndpoint {
                    kind,
                    owner: owner_id.to_owned(),
                    name: endpoint.name.clone(),
                    reason: "path must start with '/'",
                });
            }
            if resolved
                .insert(endpoint.name.clone(), endpoint.path.clone())
                .is_some()
            {
                return Err(Error::InvalidEndpoint {
                    kind,
                    owner: owner_id.to_owned(),
                    name: endpoint.name.clone(),
                    reason: "endpoint name declared twice",
                });
            }
        }

        let base = format!("{}/{prefix}", kind.mount_root());
        mounts.insert(prefix.to_owned(), MountPoint {
            owner_id: owner_id.to_owned(),
            base: base.clone(),
            endpoints: resolved,
        });
        Ok(base)
    }

    #[must_use]
    pub fn is_mounted(&self, kind: FragmentKind, prefix: &str) -> bool {
        self.mounts
            .get(&kind)
            .is_some_and(|mounts| mounts.contains_key(prefix))
    }

    /// Resolve a logical endpoint name to a URL.
    ///
    /// Core endpoint names resolve regardless of `kind`. Other names have the
    /// form `<prefix>.<endpoint>` and are looked up in the mounts of `kind`.
    pub fn url_for(&self, kind: Option<FragmentKind>, name: &str) -> Result<String> {
        if let Some(path) = self.core.get(name) {
            return Ok(path.clone());
        }

        let kind = kind.ok_or_else(|| Error::unresolved(None, name))?;
        let (prefix, endpoint) = name
            .split_once('.')
            .ok_or_else(|| Error::unresolved(Some(kind), name))?;

        let mount = self
            .mounts
            .get(&kind)
            .and_then(|mounts| mounts.get(prefix))
            .ok_or_else(|| Error::unresolved(Some(kind), name))?;
        let path = mount
            .endpoints
            .get(endpoint)
            .ok_or_else(|| Error::unresolved(Some(kind), name))?;

        Ok(format!("{}{path}", mount.base))
    }
}

fn validate_prefix(kind: FragmentKind, owner_id: &str, prefix: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidRoutePrefix {
        kind,
        prefix: prefix.to_owned(),
        owner: owner_id.to_owned(),
        reason,
    };

    if prefix.is_empty() {
        return Err(invalid("prefix is empty"));
    }
    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("only ASCII letters, digits, '-' and '_' are allowed"));
    }
    if RESERVED_PREFIXES.contains(&prefix) {
        return Err(invalid("prefix is reserved for a core route"));
    }
    Ok(())
}
