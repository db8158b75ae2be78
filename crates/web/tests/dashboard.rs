//! End-to-end tests: a real server on a loopback port driven over HTTP.

use std::{net::SocketAddr, sync::Arc};

use {
    autodash_auth::{Authenticator, StaticCredentials},
    autodash_gateway::{AppState, GatewayState, StoreHandle},
    autodash_plugins::{FragmentRoutes, NavItem, ProvidesUi, UiFragment},
    autodash_sessions::{
        Attribute, Connector, LogRecord, MemorySessionStore, OwnerRecord, SessionStore, Vehicle,
    },
    autodash_web::{WebUiInfo, WebUiPlugin, dashboard_app, discover_fragments},
    axum::{Router, routing::get},
    chrono::Utc,
    reqwest::{StatusCode, redirect::Policy},
    tokio::net::TcpListener,
};

const VIN: &str = "WVWZZZ1KZAW000001";

struct MockConnector;

impl ProvidesUi for MockConnector {
    fn ui_fragment(&self) -> Option<UiFragment> {
        let router = Router::new().route("/info", get(|| async { "mock connector info" }));
        Some(
            UiFragment::new("Mock Cloud")
                .with_nav_items(vec![
                    NavItem::endpoint("Info", "mock.info"),
                    NavItem::url("Vendor site", "https://vendor.example"),
                ])
                .with_routes(FragmentRoutes::new("mock", router).endpoint("info", "/info")),
        )
    }
}

impl Connector for MockConnector {
    fn id(&self) -> &str {
        "mock"
    }

    fn connector_type(&self) -> &str {
        "autodash-connector-mock"
    }

    fn version(&self) -> &str {
        "1.2.3"
    }

    fn status(&self) -> Vec<Attribute> {
        vec![Attribute::new("connection", "connected")]
    }
}

fn seeded_store() -> Arc<MemorySessionStore> {
    let store = Arc::new(MemorySessionStore::new("0.9.0"));

    let mut vehicle = Vehicle::new(VIN);
    vehicle.name = Some("Family Car".into());
    vehicle.model = Some("ID.3".into());
    vehicle.manufacturer = Some("Volkswagen".into());
    vehicle.attributes = vec![
        Attribute::new("range", 312).with_unit("km").updated_at(Utc::now()),
        Attribute::new("odometer", 12000).with_unit("km").disabled(),
    ];
    store.upsert_vehicle(vehicle);
    store.set_vehicle_image(VIN, "car", image::DynamicImage::new_rgb8(4, 4));

    store.add_connector(Arc::new(MockConnector));
    store.add_connector(Arc::new(OwnerRecord::new("plain", "autodash-connector-plain", "0.1.0")));
    store.add_plugin(Arc::new(WebUiPlugin::new(WebUiInfo {
        listen: "127.0.0.1:0".into(),
        tls: false,
        auth_disabled: false,
        users: 1,
        locale: "en_US".into(),
    })));

    store.log_buffer().push(LogRecord {
        timestamp: Utc::now(),
        level: "INFO".into(),
        target: "autodash".into(),
        message: "\u{1b}[32mconnected\u{1b}[0m <ok>".into(),
    });
    store
}

async fn start_server(store: Option<Arc<MemorySessionStore>>) -> (SocketAddr, AppState) {
    let composition = match &store {
        Some(store) => discover_fragments(store.as_ref()).unwrap(),
        None => discover_fragments(&MemorySessionStore::new("0")).unwrap(),
    };
    let handle = StoreHandle::new();
    if let Some(store) = store {
        handle.attach(store);
    }
    let auth = Authenticator::new(Arc::new(StaticCredentials::from_pairs([(
        "admin", "secret",
    )])));
    let state = AppState::new(GatewayState::new(composition.navigator, auth, handle));
    let app = dashboard_app(state.clone(), composition.mounts);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

async fn get_as_admin(addr: SocketAddr, path: &str) -> reqwest::Response {
    client()
        .get(format!("http://{addr}{path}"))
        .basic_auth("admin", Some("secret"))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn root_redirects_to_garage() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client().get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/garage/");
}

#[tokio::test]
async fn garage_requires_login() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .get(format!("http://{addr}/garage/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login?next=%2Fgarage%2F");
}

#[tokio::test]
async fn garage_page_lists_vehicles_and_fragments() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = get_as_admin(addr, "/garage/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();

    assert!(body.contains("Family Car"));
    assert!(body.contains(VIN));
    assert!(body.contains("312km"));
    assert!(!body.contains("12000"), "disabled attribute rendered");
    assert!(body.contains(&format!("/garage/{VIN}-car.png?fallback=img/car-placeholder.png")));

    // Connector fragments come after Status and the divider, in order.
    let status = body.find("/connectors/status\">Status").unwrap();
    let mock = body.find("Mock Cloud").unwrap();
    assert!(status < mock);
    assert!(body.contains("href=\"/connectors/mock/info\""));
    assert!(body.contains("href=\"https://vendor.example\""));
    assert!(body.contains("href=\"/plugins/webui/status\""));
    assert!(body.contains("Logged in as admin"));
}

#[tokio::test]
async fn vehicle_page_and_unknown_vehicle() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = get_as_admin(addr, &format!("/garage/{VIN}/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("model: ID.3"));
    assert!(body.contains("manufacturer: Volkswagen"));

    let resp = get_as_admin(addr, "/garage/UNKNOWN/").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vehicle_json_with_cache_header() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = get_as_admin(addr, "/garage/UNKNOWN/json").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = get_as_admin(addr, &format!("/garage/{VIN}/json")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["cache-control"], "private, max-age=5");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["id"], VIN);
    assert_eq!(body["images"], serde_json::json!(["car"]));

    let resp = get_as_admin(addr, "/garage/json").await;
    assert_eq!(resp.headers()["cache-control"], "private, max-age=5");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["vehicles"][0]["id"], VIN);
}

#[tokio::test]
async fn vehicle_image_as_png_and_json() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = get_as_admin(addr, &format!("/garage/{VIN}-car.png")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "image/png");
    let bytes = resp.bytes().await.unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));

    let resp = get_as_admin(addr, &format!("/garage/{VIN}-car.png.json")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["type"], "image/png");
    assert_eq!(body["encoding"], "base64");
    assert!(body["data"].as_str().unwrap().starts_with("iVBORw0KGgo"));
}

#[tokio::test]
async fn missing_image_falls_back_or_404s() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = get_as_admin(addr, &format!("/garage/{VIN}-front.png?fallback=logo.png")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/static/logo.png");

    let resp = get_as_admin(addr, &format!("/garage/{VIN}-front.png")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = get_as_admin(addr, "/garage/UNKNOWN-car.png").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = get_as_admin(addr, &format!("/garage/{VIN}-front.png?fallback=a%0Ab")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn form_login_sets_cookie_and_honours_next() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = client()
        .post(format!("http://{addr}/login"))
        .form(&[
            ("username", "admin"),
            ("password", "secret"),
            ("next", "/connectors/status"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/connectors/status");
    let set_cookie = resp.headers()["set-cookie"].to_str().unwrap().to_owned();
    assert!(set_cookie.starts_with("autodash_session="));
    assert!(!set_cookie.contains("Max-Age"), "{set_cookie}");

    let cookie = set_cookie.split(';').next().unwrap().to_owned();
    let resp = client()
        .get(format!("http://{addr}/connectors/status"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("autodash-connector-mock"));
    assert!(body.contains("connected"));
    assert!(body.contains("Logged in as admin"));
}

#[tokio::test]
async fn remember_me_sets_persistent_cookie() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .post(format!("http://{addr}/login"))
        .form(&[
            ("username", "admin"),
            ("password", "secret"),
            ("remember_me", "on"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/garage/");
    let set_cookie = resp.headers()["set-cookie"].to_str().unwrap();
    assert!(set_cookie.contains("Max-Age=2592000"), "{set_cookie}");
}

#[tokio::test]
async fn wrong_password_rerenders_form() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .post(format!("http://{addr}/login"))
        .form(&[("username", "admin"), ("password", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get("set-cookie").is_none());
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("User unknown or password is wrong")
    );
}

#[tokio::test]
async fn offsite_next_is_ignored() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .post(format!("http://{addr}/login"))
        .form(&[
            ("username", "admin"),
            ("password", "secret"),
            ("next", "https://evil.example/"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "/garage/");
}

#[tokio::test]
async fn next_with_line_break_goes_to_garage() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .post(format!("http://{addr}/login"))
        .form(&[
            ("username", "admin"),
            ("password", "secret"),
            ("next", "/a\nb"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/garage/");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (addr, state) = start_server(Some(seeded_store())).await;
    let session = state.gateway.auth.login("admin", "secret", false).unwrap();
    let cookie = format!("autodash_session={}", session.token);

    let resp = client()
        .get(format!("http://{addr}/logout"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/login");
    assert!(resp.headers()["set-cookie"].to_str().unwrap().contains("Max-Age=0"));

    let resp = client()
        .get(format!("http://{addr}/garage/"))
        .header("cookie", &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn status_pages() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = client()
        .get(format!("http://{addr}/plugins/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/plugins/status");

    let body = get_as_admin(addr, "/plugins/status").await.text().await.unwrap();
    assert!(body.contains("autodash-webui"));

    let body = get_as_admin(addr, "/connectors/status").await.text().await.unwrap();
    assert!(body.contains("autodash-connector-plain"));
}

#[tokio::test]
async fn fragment_routes_are_mounted_behind_login() {
    let (addr, _) = start_server(Some(seeded_store())).await;

    let resp = client()
        .get(format!("http://{addr}/connectors/mock/info"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = get_as_admin(addr, "/connectors/mock/info").await;
    assert_eq!(resp.text().await.unwrap(), "mock connector info");

    let resp = get_as_admin(addr, "/plugins/webui/status").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Listening on"));
    assert!(body.contains("127.0.0.1:0"));
}

#[tokio::test]
async fn log_page_is_public_and_renders_ansi() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client().get(format!("http://{addr}/log")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("<span style=\"color:green;\">connected</span> &lt;ok&gt;"));
    assert!(!body.contains("Logged in as"));
}

#[tokio::test]
async fn about_lists_component_versions() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let body = client()
        .get(format!("http://{addr}/about"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("aggregator"));
    assert!(body.contains("0.9.0"));
    assert!(body.contains("autodash-connector-mock"));
    assert!(body.contains("1.2.3"));
    assert!(body.contains("autodash-webui"));
}

#[tokio::test]
async fn restart_refresh_page() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let body = client()
        .get(format!("http://{addr}/restartrefresh"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("http-equiv=\"refresh\" content=\"10;url=/\""));
}

#[tokio::test]
async fn static_assets_are_served() {
    let (addr, _) = start_server(Some(seeded_store())).await;
    let resp = client()
        .get(format!("http://{addr}/static/style.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/css; charset=utf-8");

    let resp = client()
        .get(format!("http://{addr}/static/missing.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_store_is_a_server_error() {
    let (addr, _) = start_server(None).await;

    let resp = get_as_admin(addr, "/garage/").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), "session store not connected");

    let resp = client()
        .get(format!("http://{addr}/healthcheck"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), "session store not connected");
}

#[tokio::test]
async fn basic_and_form_login_resolve_the_same_user() {
    let (addr, state) = start_server(Some(seeded_store())).await;
    let session = state.gateway.auth.login("admin", "secret", false).unwrap();

    let via_basic = get_as_admin(addr, "/garage/").await.text().await.unwrap();
    let via_cookie = client()
        .get(format!("http://{addr}/garage/"))
        .header("cookie", format!("autodash_session={}", session.token))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(via_basic.contains("Logged in as admin"));
    assert!(via_cookie.contains("Logged in as admin"));
}

#[test]
fn store_trait_object_is_usable_for_discovery() {
    let store: Arc<dyn SessionStore> = seeded_store();
    let composition = discover_fragments(store.as_ref()).unwrap();
    assert_eq!(composition.fragment_count(), 2);
    assert!(composition.navigator.connectors().contains("mock"));
    assert!(!composition.navigator.connectors().contains("plain"));
    assert!(composition.navigator.plugins().contains("webui"));
}
