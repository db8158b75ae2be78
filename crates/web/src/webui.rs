//! The dashboard's own plugin entry.
//!
//! The dashboard is itself a plugin of the aggregator. It shows up on the
//! plugins page and contributes a "Web UI" fragment with a status page.

use std::sync::Arc;

use {
    autodash_gateway::{AppState, auth_middleware::CurrentUser},
    autodash_plugins::{FragmentRoutes, NavItem, ProvidesUi, UiFragment},
    autodash_sessions::{Attribute, Plugin},
    axum::{
        Extension, Router,
        extract::State,
        response::Html,
        routing::get,
    },
};

use crate::{
    error::Result,
    templates::{Layout, StatusItem, WebUiStatusTemplate, render},
};

pub const WEBUI_ID: &str = "webui";
pub const WEBUI_PREFIX: &str = "webui";
const WEBUI_TYPE: &str = "autodash-webui";

/// Settings the dashboard was started with, shown on its status page.
#[derive(Debug, Clone)]
pub struct WebUiInfo {
    pub listen: String,
    pub tls: bool,
    pub auth_disabled: bool,
    pub users: usize,
    pub locale: String,
}

pub struct WebUiPlugin {
    info: Arc<WebUiInfo>,
}

impl WebUiPlugin {
    pub fn new(info: WebUiInfo) -> Self {
        Self {
            info: Arc::new(info),
        }
    }
}

impl ProvidesUi for WebUiPlugin {
    fn ui_fragment(&self) -> Option<UiFragment> {
        let router = Router::new()
            .route("/status", get(status_handler))
            .with_state(Arc::clone(&self.info));
        Some(
            UiFragment::new("Web UI")
                .with_nav_items(vec![NavItem::endpoint("Status", "webui.status")])
                .with_routes(FragmentRoutes::new(WEBUI_PREFIX, router).endpoint("status", "/status")),
        )
    }
}

impl Plugin for WebUiPlugin {
    fn id(&self) -> &str {
        WEBUI_ID
    }

    fn plugin_type(&self) -> &str {
        WEBUI_TYPE
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn status(&self) -> Vec<Attribute> {
        vec![
            Attribute::new("listen", self.info.listen.clone()),
            Attribute::new("tls", self.info.tls),
        ]
    }
}

/// `GET /plugins/webui/status`
async fn status_handler(
    State(info): State<Arc<WebUiInfo>>,
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let auth = if info.auth_disabled {
        "disabled".to_owned()
    } else {
        format!("{} user(s)", info.users)
    };
    let template = WebUiStatusTemplate {
        layout: Layout::new(gw, "Web UI", Some(&user))?,
        items: vec![
            StatusItem {
                label: "Version",
                value: gw.version.clone(),
            },
            StatusItem {
                label: "Listening on",
                value: info.listen.clone(),
            },
            StatusItem {
                label: "TLS",
                value: if info.tls { "enabled" } else { "disabled" }.to_owned(),
            },
            StatusItem {
                label: "Authentication",
                value: auth,
            },
            StatusItem {
                label: "Locale",
                value: info.locale.clone(),
            },
            StatusItem {
                label: "Fragments",
                value: (gw.navigator.plugins().len() + gw.navigator.connectors().len()).to_string(),
            },
        ],
    };
    render("webui_status.html", &template)
}
