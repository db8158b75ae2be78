//! Browser-facing dashboard: HTML pages, JSON and image endpoints, form
//! login, and embedded static assets.
//!
//! This crate depends on `autodash-gateway` for [`AppState`] and the login
//! gate. [`web_routes`] splits the pages into public and login-protected
//! routers and nests every fragment mount into the protected one;
//! [`dashboard_app`] hands both to the gateway.

pub mod api;
pub mod assets;
pub mod error;
pub mod format;
pub mod login;
pub mod pages;
pub mod templates;
pub mod webui;

use {
    autodash_gateway::{AppState, build_gateway_app},
    autodash_plugins::{Composition, FragmentKind, Mount, Owner, ProvidesUi, discover_and_register},
    autodash_sessions::SessionStore,
    axum::{Router, routing::get},
};

pub use {
    error::{Error, Result},
    webui::{WebUiInfo, WebUiPlugin},
};

/// Page routers before the gateway assembles them.
pub struct WebRoutes {
    pub public: Router<AppState>,
    pub protected: Router<AppState>,
}

/// Build the dashboard routes. Fragment mounts go behind the login gate.
pub fn web_routes(mounts: Vec<Mount>) -> WebRoutes {
    let public = Router::new()
        .route("/", get(pages::root_handler))
        .route(
            "/login",
            get(login::login_page_handler).post(login::login_submit_handler),
        )
        .route("/log", get(pages::log_handler))
        .route("/about", get(pages::about_handler))
        .route("/plugins/", get(pages::plugins_root_handler))
        .route("/restartrefresh", get(pages::restart_refresh_handler))
        .route("/static/{*path}", get(assets::static_handler));

    let protected = Router::new()
        .route("/garage/", get(pages::garage_handler))
        .route("/garage/json", get(api::garage_json_handler))
        .route("/garage/{id}/", get(pages::vehicle_handler))
        .route("/garage/{id}/json", get(api::vehicle_json_handler))
        .route("/garage/{id}", get(api::vehicle_image_handler))
        .route("/connectors/status", get(pages::connectors_status_handler))
        .route("/plugins/status", get(pages::plugins_status_handler))
        .route("/logout", get(login::logout_handler));
    let protected = mounts
        .into_iter()
        .fold(protected, |router, mount| mount.nest_into(router));

    WebRoutes { public, protected }
}

/// The complete application for `state`, with `mounts` from discovery.
pub fn dashboard_app(state: AppState, mounts: Vec<Mount>) -> Router {
    let WebRoutes { public, protected } = web_routes(mounts);
    build_gateway_app(state, public, protected)
}

/// Ask every connector, then every plugin of `store` for its UI fragment.
///
/// Registration order is the store's iteration order, which fixes menu
/// order.
pub fn discover_fragments(store: &dyn SessionStore) -> autodash_plugins::Result<Composition> {
    let connectors = store.connectors();
    let plugins = store.plugins();

    let owners = connectors
        .iter()
        .map(|c| Owner::new(c.id(), FragmentKind::Connector, c.as_ref() as &dyn ProvidesUi))
        .chain(
            plugins
                .iter()
                .map(|p| Owner::new(p.id(), FragmentKind::Plugin, p.as_ref() as &dyn ProvidesUi)),
        );
    discover_and_register(owners)
}
