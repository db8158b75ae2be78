//! Fragment discovery and per-kind registries.

use std::collections::HashMap;

use {axum::Router, tracing::{debug, info}};

use crate::{
    error::{Error, Result},
    fragment::{FragmentKind, NavItem, ProvidesUi, UiFragment},
    nav::Navigator,
    routes::RouteTable,
};

/// A connector or plugin asked for its UI contribution during discovery.
pub struct Owner<'a> {
    pub id: &'a str,
    pub kind: FragmentKind,
    pub ui: &'a dyn ProvidesUi,
}

impl<'a> Owner<'a> {
    pub fn new(id: &'a str, kind: FragmentKind, ui: &'a dyn ProvidesUi) -> Self {
        Self { id, kind, ui }
    }
}

/// A fragment after registration. Its routes have been split off into a
/// [`Mount`].
#[derive(Debug, Clone)]
pub struct RegisteredFragment {
    pub owner_id: String,
    pub title: String,
    pub nav_items: Vec<NavItem>,
    pub route_prefix: Option<String>,
}

/// Insertion-ordered `owner_id → fragment` mapping for one kind.
#[derive(Debug, Clone)]
pub struct FragmentRegistry {
    kind: FragmentKind,
    fragments: Vec<RegisteredFragment>,
    index: HashMap<String, usize>,
}

impl FragmentRegistry {
    pub fn new(kind: FragmentKind) -> Self {
        Self {
            kind,
            fragments: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    fn insert(&mut self, fragment: RegisteredFragment) -> Result<()> {
        if self.index.contains_key(&fragment.owner_id) {
            return Err(Error::DuplicateOwner {
                kind: self.kind,
                owner: fragment.owner_id,
            });
        }
        self.index
            .insert(fragment.owner_id.clone(), self.fragments.len());
        self.fragments.push(fragment);
        Ok(())
    }

    pub fn get(&self, owner_id: &str) -> Option<&RegisteredFragment> {
        self.index.get(owner_id).map(|&i| &self.fragments[i])
    }

    pub fn contains(&self, owner_id: &str) -> bool {
        self.index.contains_key(owner_id)
    }

    /// Fragments in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFragment> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A fragment's request handlers together with the path they are mounted at.
pub struct Mount {
    pub kind: FragmentKind,
    pub owner_id: String,
    pub base: String,
    pub router: Router,
}

impl Mount {
    /// Nest this fragment's handlers into `router` at the mount base.
    pub fn nest_into<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.nest_service(&self.base, self.router)
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount")
            .field("kind", &self.kind)
            .field("owner_id", &self.owner_id)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// Result of discovery: the navigator over both registries, and the routers
/// the web layer has to mount.
#[derive(Debug)]
pub struct Composition {
    pub navigator: Navigator,
    pub mounts: Vec<Mount>,
}

impl Composition {
    /// Number of fragments registered across both kinds.
    pub fn fragment_count(&self) -> usize {
        self.navigator.plugins().len() + self.navigator.connectors().len()
    }
}

/// Ask every owner for its optional UI fragment and register what they
/// return.
///
/// Registration order is the iteration order of `owners`. Owners without a
/// fragment are skipped. Any route collision or malformed route declaration
/// aborts discovery.
pub fn discover_and_register<'a>(
    owners: impl IntoIterator<Item = Owner<'a>>,
) -> Result<Composition> {
    let mut plugins = FragmentRegistry::new(FragmentKind::Plugin);
    let mut connectors = FragmentRegistry::new(FragmentKind::Connector);
    let mut routes = RouteTable::with_core_endpoints();
    let mut mounts = Vec::new();

    for owner in owners {
        let Some(fragment) = owner.ui.ui_fragment() else {
            debug!(kind = %owner.kind, owner = owner.id, "no UI fragment");
            continue;
        };

        let registry = match owner.kind {
            FragmentKind::Plugin => &mut plugins,
            FragmentKind::Connector => &mut connectors,
        };
        if registry.contains(owner.id) {
            return Err(Error::DuplicateOwner {
                kind: owner.kind,
                owner: owner.id.to_owned(),
            });
        }

        let UiFragment {
            title,
            nav_items,
            routes: fragment_routes,
        } = fragment;

        let route_prefix = match fragment_routes {
            Some(fragment_routes) => {
                let base = routes.mount(
                    owner.kind,
                    owner.id,
                    &fragment_routes.prefix,
                    &fragment_routes.endpoints,
                )?;
                mounts.push(Mount {
                    kind: owner.kind,
                    owner_id: owner.id.to_owned(),
                    base,
                    router: fragment_routes.router,
                });
                Some(fragment_routes.prefix)
            },
            None => None,
        };

        info!(
            kind = %owner.kind,
            owner = owner.id,
            title = %title,
            prefix = route_prefix.as_deref().unwrap_or("-"),
            "registered UI fragment"
        );

        registry.insert(RegisteredFragment {
            owner_id: owner.id.to_owned(),
            title,
            nav_items,
            route_prefix,
        })?;
    }

    Ok(Composition {
        navigator: Navigator::new(plugins, connectors, routes),
        mounts,
    })
}
