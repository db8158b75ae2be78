//! Navigation menu composition.

use serde::Serialize;

use crate::{
    error::Result,
    fragment::{FragmentKind, NavItem, NavTarget},
    registry::FragmentRegistry,
    routes::{RouteTable, endpoints},
};

/// A resolved navigation node, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavEntry {
    Link {
        text: String,
        url: Option<String>,
        children: Vec<NavEntry>,
    },
    Divider,
}

impl NavEntry {
    fn link(text: impl Into<String>, url: Option<String>, children: Vec<NavEntry>) -> Self {
        Self::Link {
            text: text.into(),
            url,
            children,
        }
    }

    pub fn is_divider(&self) -> bool {
        matches!(self, Self::Divider)
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Link { text, .. } => text,
            Self::Divider => "",
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link { url, .. } => url.as_deref(),
            Self::Divider => None,
        }
    }

    /// Link target for rendering; entries without a URL point at `#`.
    pub fn href(&self) -> &str {
        self.url().unwrap_or("#")
    }

    pub fn children(&self) -> &[NavEntry] {
        match self {
            Self::Link { children, .. } => children,
            Self::Divider => &[],
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }
}

/// Builds the navigation menu from the fixed core entries and both fragment
/// registries. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Navigator {
    plugins: FragmentRegistry,
    connectors: FragmentRegistry,
    routes: RouteTable,
}

impl Navigator {
    pub fn new(plugins: FragmentRegistry, connectors: FragmentRegistry, routes: RouteTable) -> Self {
        Self {
            plugins,
            connectors,
            routes,
        }
    }

    pub fn plugins(&self) -> &FragmentRegistry {
        &self.plugins
    }

    pub fn connectors(&self) -> &FragmentRegistry {
        &self.connectors
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn url_for(&self, name: &str) -> Result<String> {
        self.routes.url_for(None, name)
    }

    /// Assemble the full menu: Garage, Connectors, Plugins, Log.
    pub fn build_nav(&self) -> Result<Vec<NavEntry>> {
        Ok(vec![
            NavEntry::link("Garage", Some(self.url_for(endpoints::GARAGE)?), Vec::new()),
            self.group("Connectors", &self.connectors, endpoints::CONNECTORS_STATUS)?,
            self.group("Plugins", &self.plugins, endpoints::PLUGINS_STATUS)?,
            NavEntry::link("Log", Some(self.url_for(endpoints::LOG)?), Vec::new()),
        ])
    }

    fn group(&self, text: &str, registry: &FragmentRegistry, status: &str) -> Result<NavEntry> {
        let status_url = self.url_for(status)?;

        let mut children = Vec::with_capacity(registry.len() + 2);
        children.push(NavEntry::link("Status", Some(status_url.clone()), Vec::new()));
        children.push(NavEntry::Divider);
        for fragment in registry.iter() {
            children.push(NavEntry::link(
                fragment.title.clone(),
                Some(status_url.clone()),
                self.resolve_items(registry.kind(), &fragment.nav_items)?,
            ));
        }

        Ok(NavEntry::link(text, Some(status_url), children))
    }

    fn resolve_items(&self, kind: FragmentKind, items: &[NavItem]) -> Result<Vec<NavEntry>> {
        items
            .iter()
            .map(|item| match item {
                NavItem::Divider => Ok(NavEntry::Divider),
                NavItem::Link {
                    text,
                    target,
                    children,
                } => {
                    let url = match target {
                        Some(NavTarget::Endpoint(name)) => {
                            Some(self.routes.url_for(Some(kind), name)?)
                        },
                        Some(NavTarget::Url(url)) => Some(url.clone()),
                        None => None,
                    };
                    Ok(NavEntry::link(
                        text.clone(),
                        url,
                        self.resolve_items(kind, children)?,
                    ))
                },
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use axum::Router;

    use super::*;
    use crate::{
        Error,
        fragment::{FragmentRoutes, ProvidesUi, UiFragment},
        registry::{Owner, discover_and_register},
    };

    struct Titled(&'static str, Vec<NavItem>);

    impl ProvidesUi for Titled {
        fn ui_fragment(&self) -> Option<UiFragment> {
            Some(UiFragment::new(self.0).with_nav_items(self.1.clone()))
        }
    }

    struct Routed;

    impl ProvidesUi for Routed {
        fn ui_fragment(&self) -> Option<UiFragment> {
            Some(
                UiFragment::new("Web UI")
                    .with_nav_items(vec![NavItem::endpoint("Status", "webui.status")])
                    .with_routes(
                        FragmentRoutes::new("webui", Router::new()).endpoint("status", "/status"),
                    ),
            )
        }
    }

    struct NoUi;
    impl ProvidesUi for NoUi {}

    fn texts(entries: &[NavEntry]) -> Vec<&str> {
        entries.iter().map(NavEntry::text).collect()
    }

    #[test]
    fn empty_registries_still_have_core_menu() {
        let composition = discover_and_register(Vec::<Owner<'_>>::new()).unwrap();
        let nav = composition.navigator.build_nav().unwrap();

        assert_eq!(texts(&nav), ["Garage", "Connectors", "Plugins", "Log"]);
        assert_eq!(nav[0].url(), Some("/garage/"));
        assert_eq!(nav[3].url(), Some("/log"));

        let connectors = nav[1].children();
        assert_eq!(connectors.len(), 2);
        assert_eq!(connectors[0].text(), "Status");
        assert_eq!(connectors[0].url(), Some("/connectors/status"));
        assert!(connectors[1].is_divider());
    }

    #[test]
    fn connector_entries_follow_status_and_divider_in_order() {
        let a = Titled("Alpha", vec![NavItem::url("Docs", "https://example.org")]);
        let b = Titled("Beta", vec![]);
        let composition = discover_and_register([
            Owner::new("a", FragmentKind::Connector, &a),
            Owner::new("none", FragmentKind::Connector, &NoUi),
            Owner::new("b", FragmentKind::Connector, &b),
        ])
        .unwrap();
        let nav = composition.navigator.build_nav().unwrap();

        let connectors = nav[1].children();
        assert_eq!(texts(connectors), ["Status", "", "Alpha", "Beta"]);
        assert_eq!(connectors[2].url(), Some("/connectors/status"));
        assert_eq!(texts(connectors[2].children()), ["Docs"]);
        assert_eq!(connectors[2].children()[0].url(), Some("https://example.org"));

        // plugins group is untouched by connector fragments
        assert_eq!(nav[2].children().len(), 2);
    }

    #[test]
    fn fragment_endpoints_resolve_against_their_mount() {
        let composition =
            discover_and_register([Owner::new("webui", FragmentKind::Plugin, &Routed)]).unwrap();
        let nav = composition.navigator.build_nav().unwrap();

        let webui = &nav[2].children()[2];
        assert_eq!(webui.text(), "Web UI");
        assert_eq!(webui.children()[0].url(), Some("/plugins/webui/status"));
    }

    #[test]
    fn nested_items_keep_dividers_and_groups() {
        let ui = Titled("Grouped", vec![
            NavItem::group("More", vec![
                NavItem::url("One", "/one"),
                NavItem::divider(),
                NavItem::url("Two", "/two"),
            ]),
        ]);
        let composition =
            discover_and_register([Owner::new("g", FragmentKind::Plugin, &ui)]).unwrap();
        let nav = composition.navigator.build_nav().unwrap();

        let more = &nav[2].children()[2].children()[0];
        assert_eq!(more.url(), None);
        assert_eq!(more.href(), "#");
        assert_eq!(texts(more.children()), ["One", "", "Two"]);
        assert!(more.children()[1].is_divider());
    }

    #[test]
    fn unknown_endpoint_surfaces_as_error() {
        let ui = Titled("Broken", vec![NavItem::endpoint("Gone", "broken.gone")]);
        let composition =
            discover_and_register([Owner::new("broken", FragmentKind::Plugin, &ui)]).unwrap();
        let err = composition.navigator.build_nav().unwrap_err();
        assert!(matches!(err, Error::UnresolvedEndpoint { .. }));
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = NavEntry::Divider;
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"type": "divider"})
        );
    }
}
