use std::time::Instant;

use {
    axum::{extract::Request, middleware::Next, response::Response},
    tracing::info,
};

/// Paths polled often enough that logging them would drown everything else.
const QUIET_PATHS: &[&str] = &["/healthcheck"];

/// Log one line per request under the `autodash::access` target.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    if !QUIET_PATHS.contains(&path.as_str()) {
        info!(
            target: "autodash::access",
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request"
        );
    }
    response
}
