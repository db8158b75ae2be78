//! Page templates and the view models they render.

use {
    askama::Template,
    autodash_auth::{AuthIdentity, AuthMethod},
    autodash_gateway::GatewayState,
    autodash_plugins::NavEntry,
    axum::response::Html,
};

use crate::error::{Error, Result};

/// Data every page shares: the navigation menu and who is logged in.
pub struct Layout {
    pub title: String,
    pub nav: Vec<NavEntry>,
    pub version: String,
    /// Username shown next to the logout link. `None` for anonymous visitors
    /// and when authentication is disabled.
    pub user: Option<String>,
}

impl Layout {
    /// Build the layout for one request. The menu is composed fresh every
    /// time.
    pub fn new(
        state: &GatewayState,
        title: impl Into<String>,
        identity: Option<&AuthIdentity>,
    ) -> Result<Self> {
        Ok(Self {
            title: title.into(),
            nav: state.navigator.build_nav()?,
            version: state.version.clone(),
            user: identity
                .filter(|id| id.method != AuthMethod::Disabled)
                .map(|id| id.username.clone()),
        })
    }
}

pub(crate) fn render<T: Template>(name: &'static str, template: &T) -> Result<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|source| Error::Render {
            template: name,
            source,
        })
}

// ── View models ──────────────────────────────────────────────────────────────

pub struct VehicleCard {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub connector: Option<String>,
    pub image_url: String,
    /// Pre-rendered attribute snippets.
    pub summary: Vec<String>,
}

pub struct AttributeRow {
    pub name: String,
    pub html: String,
}

pub struct OwnerRow {
    pub id: String,
    pub kind: String,
    pub version: String,
    pub healthy: bool,
    pub status: Vec<String>,
}

pub struct LogLine {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message_html: String,
}

pub struct ComponentVersion {
    pub name: String,
    pub version: String,
}

pub struct StatusItem {
    pub label: &'static str,
    pub value: String,
}

// ── Templates ────────────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "garage.html", escape = "html")]
pub struct GarageTemplate {
    pub layout: Layout,
    pub vehicles: Vec<VehicleCard>,
}

#[derive(Template)]
#[template(path = "vehicle.html", escape = "html")]
pub struct VehicleTemplate {
    pub layout: Layout,
    pub vehicle: VehicleCard,
    pub attributes: Vec<AttributeRow>,
    pub images: Vec<String>,
}

#[derive(Template)]
#[template(path = "owners.html", escape = "html")]
pub struct OwnersTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub owners: Vec<OwnerRow>,
}

#[derive(Template)]
#[template(path = "log.html", escape = "html")]
pub struct LogTemplate {
    pub layout: Layout,
    pub lines: Vec<LogLine>,
}

#[derive(Template)]
#[template(path = "about.html", escape = "html")]
pub struct AboutTemplate {
    pub layout: Layout,
    pub versions: Vec<ComponentVersion>,
}

#[derive(Template)]
#[template(path = "login.html", escape = "html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub next: String,
    pub username: String,
    pub error: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "restart.html", escape = "html")]
pub struct RestartTemplate {
    pub layout: Layout,
    pub delay_secs: u64,
}

#[derive(Template)]
#[template(path = "webui_status.html", escape = "html")]
pub struct WebUiStatusTemplate {
    pub layout: Layout,
    pub items: Vec<StatusItem>,
}
