use std::{net::SocketAddr, path::Path, sync::Arc, thread::JoinHandle, time::Duration};

use {
    axum::{Extension, Router, middleware, routing::get},
    axum_server::tls_rustls::RustlsConfig,
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
};

use crate::{
    access_log::access_log,
    auth_middleware::require_login,
    error::{Error, Result},
    health::healthcheck_handler,
    restart::restart_handler,
    state::AppState,
};

/// How long in-flight TLS connections get to finish on shutdown.
const TLS_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Assemble the full application.
///
/// `public` routes are reachable without login, `protected` routes sit
/// behind [`require_login`]. The health and restart endpoints are added
/// here, and every route gets the access log.
///
/// Fragment routers are mounted as stateless services; they reach the
/// dashboard state through the `Extension<AppState>` request extension.
pub fn build_gateway_app(
    state: AppState,
    public: Router<AppState>,
    protected: Router<AppState>,
) -> Router {
    let public = public.route("/healthcheck", get(healthcheck_handler));
    let protected = protected
        .route("/restart", get(restart_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login));

    public
        .merge(protected)
        .layer(Extension(state.clone()))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    thread: JoinHandle<()>,
}

/// Runs the HTTP(S) server on a dedicated thread with its own runtime, so
/// the host process does not need to be async.
///
/// `start` binds synchronously and reports bind failures to the caller.
/// `stop` is idempotent and is also called on drop.
pub struct ServerHost {
    host: String,
    port: u16,
    tls: Option<Arc<rustls::ServerConfig>>,
    running: Option<Running>,
}

impl ServerHost {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            tls: None,
            running: None,
        }
    }

    /// Serve HTTPS with the given configuration instead of plain HTTP.
    #[must_use]
    pub fn with_tls(mut self, config: rustls::ServerConfig) -> Self {
        self.tls = Some(Arc::new(config));
        self
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Address actually bound, useful when started on port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// Base URL of the running server.
    pub fn url(&self) -> Option<String> {
        let scheme = if self.is_tls() { "https" } else { "http" };
        self.local_addr().map(|addr| format!("{scheme}://{addr}"))
    }

    pub fn start(&mut self, app: Router) -> Result<SocketAddr> {
        if let Some(running) = &self.running {
            return Err(Error::AlreadyRunning(running.addr));
        }

        let bind = format!("{}:{}", self.host, self.port);
        let listener = std::net::TcpListener::bind((self.host.as_str(), self.port))
            .map_err(|source| Error::Bind {
                addr: bind.clone(),
                source,
            })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("autodash-http-worker")
            .enable_all()
            .build()?;

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let tls = self.tls.clone();
        let thread = std::thread::Builder::new()
            .name("autodash-http".into())
            .spawn(move || {
                let result = runtime.block_on(async move {
                    match tls {
                        Some(config) => serve_tls(listener, app, config, token).await,
                        None => serve_plain(listener, app, token).await,
                    }
                });
                if let Err(e) = result {
                    error!("server error: {e}");
                }
            })?;

        info!(%addr, tls = self.tls.is_some(), "server started");
        self.running = Some(Running {
            addr,
            shutdown,
            thread,
        });
        Ok(addr)
    }

    /// Stop accepting connections and wait for the server thread to exit.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.shutdown.cancel();
        if running.thread.join().is_err() {
            error!("server thread panicked");
        }
        info!(addr = %running.addr, "server stopped");
    }
}

impl Drop for ServerHost {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn serve_plain(
    listener: std::net::TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

async fn serve_tls(
    listener: std::net::TcpListener,
    app: Router,
    config: Arc<rustls::ServerConfig>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let handle = axum_server::Handle::new();
    let watcher = handle.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        watcher.graceful_shutdown(Some(TLS_GRACE_PERIOD));
    });

    axum_server::from_tcp_rustls(listener, RustlsConfig::from_config(config))
        .handle(handle)
        .serve(app.into_make_service())
        .await
}

/// Log the start-up banner.
pub fn log_startup_banner(
    version: &str,
    url: &str,
    fragments: usize,
    config_path: Option<&Path>,
) {
    let lines = [
        format!("autodash v{version}"),
        format!("listening on {url}"),
        format!("{fragments} UI fragment(s) registered"),
        match config_path {
            Some(path) => format!("config: {}", path.display()),
            None => "config: defaults".to_owned(),
        },
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));
}
