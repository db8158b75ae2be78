//! Fragment model: what a connector or plugin contributes to the dashboard.

use std::fmt;

use {axum::Router, serde::Serialize};

/// Which registry a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Plugin,
    Connector,
}

impl FragmentKind {
    /// URL segment every fragment of this kind is mounted below.
    #[must_use]
    pub fn mount_root(self) -> &'static str {
        match self {
            Self::Plugin => "/plugins",
            Self::Connector => "/connectors",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Connector => "connector",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a navigation item points before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Logical endpoint name, e.g. `webui.status` (fragment endpoint, looked
    /// up in the owner's kind) or `garage.garage` (core endpoint).
    Endpoint(String),
    /// Literal URL used as-is.
    Url(String),
}

/// A navigation node as authored by a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    Link {
        text: String,
        target: Option<NavTarget>,
        children: Vec<NavItem>,
    },
    Divider,
}

impl NavItem {
    /// A link to a named endpoint.
    pub fn endpoint(text: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            target: Some(NavTarget::Endpoint(endpoint.into())),
            children: Vec::new(),
        }
    }

    /// A link to a literal URL.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            target: Some(NavTarget::Url(url.into())),
            children: Vec::new(),
        }
    }

    /// A grouping node without a link of its own.
    pub fn group(text: impl Into<String>, children: Vec<NavItem>) -> Self {
        Self::Link {
            text: text.into(),
            target: None,
            children,
        }
    }

    #[must_use]
    pub fn divider() -> Self {
        Self::Divider
    }
}

/// A named endpoint inside a fragment's route set. `path` is relative to the
/// fragment's mount point and starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub path: String,
}

/// Request handlers a fragment exposes, mounted under
/// `/<kind>s/<prefix>` by the registry.
pub struct FragmentRoutes {
    pub(crate) prefix: String,
    pub(crate) endpoints: Vec<Endpoint>,
    pub(crate) router: Router,
}

impl FragmentRoutes {
    pub fn new(prefix: impl Into<String>, router: Router) -> Self {
        Self {
            prefix: prefix.into(),
            endpoints: Vec::new(),
            router,
        }
    }

    /// Declare a named endpoint so navigation items can link to it.
    #[must_use]
    pub fn endpoint(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.endpoints.push(Endpoint {
            name: name.into(),
            path: path.into(),
        });
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

impl fmt::Debug for FragmentRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentRoutes")
            .field("prefix", &self.prefix)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// One owner's contribution: a title, navigation items, and optionally a set
/// of routes. Owners without dedicated pages leave `routes` empty.
#[derive(Debug)]
pub struct UiFragment {
    pub(crate) title: String,
    pub(crate) nav_items: Vec<NavItem>,
    pub(crate) routes: Option<FragmentRoutes>,
}

impl UiFragment {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nav_items: Vec::new(),
            routes: None,
        }
    }

    #[must_use]
    pub fn with_nav_items(mut self, items: Vec<NavItem>) -> Self {
        self.nav_items = items;
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: FragmentRoutes) -> Self {
        self.routes = Some(routes);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn nav_items(&self) -> &[NavItem] {
        &self.nav_items
    }

    pub fn route_prefix(&self) -> Option<&str> {
        self.routes.as_ref().map(FragmentRoutes::prefix)
    }
}

/// Optional UI capability of a connector or plugin.
///
/// The default implementation contributes nothing, so owners opt in by
/// overriding [`ProvidesUi::ui_fragment`].
pub trait ProvidesUi {
    fn ui_fragment(&self) -> Option<UiFragment> {
        None
    }
}
