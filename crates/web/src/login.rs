//! Form login and logout.

use {
    autodash_auth::{SESSION_COOKIE, clear_session_cookie, parse_cookie, session_cookie},
    autodash_gateway::AppState,
    autodash_plugins::endpoints,
    axum::{
        Form,
        extract::{Query, State},
        http::{HeaderMap, header},
        response::{IntoResponse, Redirect, Response},
    },
    serde::Deserialize,
    tracing::{info, warn},
};

use crate::{
    error::Result,
    pages::identify,
    templates::{Layout, LoginTemplate, render},
};

const LOGIN_FAILED: &str = "User unknown or password is wrong";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox: present (usually `on`) when ticked.
    pub remember_me: Option<String>,
    pub next: Option<String>,
}

/// Only local absolute paths that fit a `Location` header are accepted as
/// post-login targets.
pub(crate) fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(char::is_control)
    })
}

/// `GET /login`
pub async fn login_page_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let gw = &state.gateway;
    let template = LoginTemplate {
        layout: Layout::new(gw, "Login", identify(gw, &headers).as_ref())?,
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_owned(),
        username: String::new(),
        error: None,
    };
    Ok(render("login.html", &template)?.into_response())
}

/// `POST /login`
pub async fn login_submit_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let gw = &state.gateway;
    let remember = form.remember_me.is_some();

    let Some(session) = gw.auth.login(&form.username, &form.password, remember) else {
        warn!(user = %form.username, "login failed");
        let template = LoginTemplate {
            layout: Layout::new(gw, "Login", None)?,
            next: safe_next(form.next.as_deref()).unwrap_or_default().to_owned(),
            username: form.username,
            error: Some(LOGIN_FAILED),
        };
        return Ok(render("login.html", &template)?.into_response());
    };

    info!(user = %session.username, remember, "login");
    let target = match safe_next(form.next.as_deref()) {
        Some(next) => next.to_owned(),
        None => gw.navigator.url_for(endpoints::GARAGE)?,
    };
    let cookie = session_cookie(&session.token, session.cookie_max_age(), gw.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response())
}

/// `GET /logout`
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let gw = &state.gateway;
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|c| parse_cookie(c, SESSION_COOKIE))
    {
        gw.auth.logout(token);
    }
    let login = gw.navigator.url_for(endpoints::LOGIN)?;
    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to(&login),
    )
        .into_response())
}
