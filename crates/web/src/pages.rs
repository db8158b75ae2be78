//! HTML page handlers.

use std::sync::Arc;

use {
    autodash_auth::AuthIdentity,
    autodash_gateway::{
        AppState, GatewayState, auth_middleware::CurrentUser, restart::RESTART_DELAY,
    },
    autodash_plugins::endpoints,
    autodash_sessions::{Attribute, SessionStore, Vehicle},
    axum::{
        extract::{Path, State},
        http::{HeaderMap, header},
        response::{Html, Redirect},
    },
    chrono::Locale,
};

use crate::{
    error::{Error, Result},
    format::{AttributeStyle, ansi_to_html, format_attribute, format_timestamp},
    templates::{
        AboutTemplate, AttributeRow, ComponentVersion, GarageTemplate, Layout, LogLine, LogTemplate,
        OwnerRow, OwnersTemplate, RestartTemplate, VehicleCard, VehicleTemplate, render,
    },
};

/// Shown when a vehicle has no picture or its picture cannot be served.
pub(crate) const PLACEHOLDER_IMAGE: &str = "img/car-placeholder.png";

/// Attributes shown on the garage overview cards.
const SUMMARY_ATTRIBUTES: &[&str] = &["state", "odometer", "range", "soc"];

pub(crate) fn store(state: &GatewayState) -> Result<Arc<dyn SessionStore>> {
    state.store.get().ok_or(Error::StoreNotReady)
}

/// Resolve the caller on routes outside the login gate, so the menu can
/// still offer a logout link.
pub(crate) fn identify(state: &GatewayState, headers: &HeaderMap) -> Option<AuthIdentity> {
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.auth.identify(cookie, authorization)
}

fn picture_url(vehicle_id: &str, image: &str) -> String {
    format!("/garage/{vehicle_id}-{image}.png?fallback={PLACEHOLDER_IMAGE}")
}

fn image_url(vehicle: &Vehicle) -> String {
    match vehicle.images.keys().next() {
        Some(name) => picture_url(&vehicle.id, name),
        None => format!("/static/{PLACEHOLDER_IMAGE}"),
    }
}

fn card(vehicle: &Vehicle, locale: Locale) -> VehicleCard {
    let style = AttributeStyle {
        linebreak: true,
        ..AttributeStyle::default()
    };
    VehicleCard {
        id: vehicle.id.clone(),
        name: vehicle.display_name().to_owned(),
        model: vehicle.model.clone(),
        manufacturer: vehicle.manufacturer.clone(),
        connector: vehicle.connector.clone(),
        image_url: image_url(vehicle),
        summary: SUMMARY_ATTRIBUTES
            .iter()
            .filter_map(|name| vehicle.attribute(name))
            .map(|attr| format_attribute(attr, locale, style))
            .filter(|html| !html.is_empty())
            .collect(),
    }
}

fn status_lines(attributes: &[Attribute], locale: Locale) -> Vec<String> {
    let style = AttributeStyle {
        linebreak: true,
        ..AttributeStyle::default()
    };
    attributes
        .iter()
        .map(|attr| format_attribute(attr, locale, style))
        .filter(|html| !html.is_empty())
        .collect()
}

/// `GET /`
pub async fn root_handler(State(state): State<AppState>) -> Result<Redirect> {
    let url = state.gateway.navigator.url_for(endpoints::GARAGE)?;
    Ok(Redirect::to(&url))
}

/// `GET /plugins/`
pub async fn plugins_root_handler(State(state): State<AppState>) -> Result<Redirect> {
    let url = state.gateway.navigator.url_for(endpoints::PLUGINS_STATUS)?;
    Ok(Redirect::to(&url))
}

/// `GET /garage/`
pub async fn garage_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let garage = store(gw)?.garage();
    let template = GarageTemplate {
        layout: Layout::new(gw, "Garage", Some(&user))?,
        vehicles: garage
            .vehicles
            .iter()
            .map(|v| card(v, gw.locale))
            .collect(),
    };
    render("garage.html", &template)
}

/// `GET /garage/{id}/`
pub async fn vehicle_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let vehicle = store(gw)?
        .vehicle(&id)
        .ok_or_else(|| Error::not_found(format!("vehicle {id}")))?;

    let plain = AttributeStyle {
        label: Some(""),
        ..AttributeStyle::default()
    };
    let attributes = vehicle
        .attributes
        .iter()
        .filter(|attr| attr.enabled)
        .map(|attr| AttributeRow {
            name: attr.name.clone(),
            html: format_attribute(attr, gw.locale, plain),
        })
        .collect();
    let images = vehicle
        .images
        .keys()
        .map(|name| picture_url(&vehicle.id, name))
        .collect();

    let template = VehicleTemplate {
        layout: Layout::new(gw, vehicle.display_name(), Some(&user))?,
        vehicle: card(&vehicle, gw.locale),
        attributes,
        images,
    };
    render("vehicle.html", &template)
}

/// `GET /connectors/status`
pub async fn connectors_status_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let owners = store(gw)?
        .connectors()
        .iter()
        .map(|c| OwnerRow {
            id: c.id().to_owned(),
            kind: c.connector_type().to_owned(),
            version: c.version().to_owned(),
            healthy: c.is_healthy(),
            status: status_lines(&c.status(), gw.locale),
        })
        .collect();
    let template = OwnersTemplate {
        layout: Layout::new(gw, "Connectors", Some(&user))?,
        heading: "Connectors",
        owners,
    };
    render("owners.html", &template)
}

/// `GET /plugins/status`
pub async fn plugins_status_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let owners = store(gw)?
        .plugins()
        .iter()
        .map(|p| OwnerRow {
            id: p.id().to_owned(),
            kind: p.plugin_type().to_owned(),
            version: p.version().to_owned(),
            healthy: p.is_healthy(),
            status: status_lines(&p.status(), gw.locale),
        })
        .collect();
    let template = OwnersTemplate {
        layout: Layout::new(gw, "Plugins", Some(&user))?,
        heading: "Plugins",
        owners,
    };
    render("owners.html", &template)
}

/// `GET /log`
pub async fn log_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let lines = store(gw)?
        .log_records()
        .iter()
        .map(|record| LogLine {
            timestamp: format_timestamp(&record.timestamp, gw.locale),
            level: record.level.clone(),
            target: record.target.clone(),
            message_html: ansi_to_html(&record.message),
        })
        .collect();
    let template = LogTemplate {
        layout: Layout::new(gw, "Log", identify(gw, &headers).as_ref())?,
        lines,
    };
    render("log.html", &template)
}

/// `GET /about`: dashboard, aggregator, and one line per connector or
/// plugin type.
pub async fn about_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let store = store(gw)?;

    let mut versions = vec![
        ComponentVersion {
            name: "autodash".into(),
            version: gw.version.clone(),
        },
        ComponentVersion {
            name: "aggregator".into(),
            version: store.version(),
        },
    ];
    let owners = store
        .connectors()
        .iter()
        .map(|c| (c.connector_type().to_owned(), c.version().to_owned()))
        .chain(
            store
                .plugins()
                .iter()
                .map(|p| (p.plugin_type().to_owned(), p.version().to_owned())),
        )
        .collect::<Vec<_>>();
    for (name, version) in owners {
        if !versions.iter().any(|v| v.name == name) {
            versions.push(ComponentVersion { name, version });
        }
    }

    let template = AboutTemplate {
        layout: Layout::new(gw, "About", identify(gw, &headers).as_ref())?,
        versions,
    };
    render("about.html", &template)
}

/// `GET /restartrefresh`
pub async fn restart_refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>> {
    let gw = &state.gateway;
    let template = RestartTemplate {
        layout: Layout::new(gw, "Restarting", identify(gw, &headers).as_ref())?,
        delay_secs: RESTART_DELAY.as_secs(),
    };
    render("restart.html", &template)
}
