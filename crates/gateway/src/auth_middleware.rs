use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use autodash_auth::AuthIdentity;

use crate::state::AppState;

/// Path of the login page unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/login";

/// Middleware that gates routes behind login.
///
/// Accepts a valid session cookie or `Authorization: Basic` credentials.
/// Anything else is redirected to the login page with the original path and
/// query carried in `next`.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.gateway.auth.identify(cookie, authorization) {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        },
        None => {
            let target = request
                .uri()
                .path_and_query()
                .map_or("/", |pq| pq.as_str());
            Redirect::to(&login_redirect(target)).into_response()
        },
    }
}

/// Login URL that returns to `target` after a successful login.
pub fn login_redirect(target: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(target))
}

/// Extractor for the identity established by [`require_login`].
///
/// Rejects with 401 on routes that are not behind the login gate.
pub struct CurrentUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or((StatusCode::UNAUTHORIZED, "not authenticated"))
    }
}
