mod check_commands;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    anyhow::{Context, bail},
    autodash_auth::{Authenticator, StaticCredentials},
    autodash_config::{DashboardConfig, LoadedConfig, Severity, parse_locale},
    autodash_gateway::{AppState, GatewayState, ServerHost, StoreHandle, log_startup_banner},
    autodash_sessions::{LogBuffer, LogCaptureLayer, MemorySessionStore, Snapshot},
    autodash_tls::FsCertManager,
    autodash_web::{WebUiInfo, WebUiPlugin, dashboard_app, discover_fragments},
    clap::{Parser, Subcommand},
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

const DEFAULT_LOCALE: &str = "en_US";

#[derive(Parser)]
#[command(
    name = "autodash",
    version,
    about = "autodash: web dashboard for the vehicle connectivity aggregator"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Overrides `log_level`
    /// from the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (skips discovery in `./` and `~/.config/autodash/`).
    #[arg(long, short, global = true, env = "AUTODASH_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true, env = "AUTODASH_PORT")]
    port: Option<u16>,

    /// Locale for timestamps, e.g. `de_DE` (overrides config value).
    #[arg(long, global = true)]
    locale: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard (default when no subcommand is provided).
    Serve,
    /// Validate the configuration and print a report.
    Check,
}

/// Initialise tracing and attach a [`LogCaptureLayer`] that records events
/// into `log_buffer` for the log page.
fn init_telemetry(cli: &Cli, config: &DashboardConfig, log_buffer: LogBuffer) {
    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(LogCaptureLayer::new(log_buffer));

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load(cli: &Cli) -> anyhow::Result<LoadedConfig> {
    let mut loaded = match &cli.config {
        Some(path) => autodash_config::load_config(path)?,
        None => autodash_config::discover_and_load()?,
    };
    apply_overrides(&mut loaded.config, cli);
    Ok(loaded)
}

/// CLI args override config values.
fn apply_overrides(config: &mut DashboardConfig, cli: &Cli) {
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(locale) = &cli.locale {
        config.ui.locale = Some(locale.clone());
    }
}

/// Build the in-memory session store, seeded from the configured snapshot.
/// Snapshot image paths are relative to the snapshot file.
fn build_store(config: &DashboardConfig, log_buffer: LogBuffer) -> anyhow::Result<MemorySessionStore> {
    let snapshot = config
        .store
        .snapshot
        .as_deref()
        .map(|path| Snapshot::load(path).map(|snapshot| (snapshot, path)))
        .transpose()?;

    let version = snapshot
        .as_ref()
        .and_then(|(snapshot, _)| snapshot.version.clone())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned());
    let store = MemorySessionStore::new(version).with_log_buffer(log_buffer);

    if let Some((snapshot, path)) = snapshot {
        let base_dir = path.parent().unwrap_or(Path::new("."));
        snapshot
            .apply(&store, base_dir)
            .with_context(|| format!("failed to apply snapshot {}", path.display()))?;
        info!(path = %path.display(), "seeded session store from snapshot");
    }
    Ok(store)
}

async fn serve(loaded: LoadedConfig, log_buffer: LogBuffer) -> anyhow::Result<()> {
    let config = &loaded.config;

    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    let validation = config.validate();
    for diagnostic in &validation.diagnostics {
        match diagnostic.severity {
            Severity::Error => error!("{diagnostic}"),
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Info => info!("{diagnostic}"),
        }
    }
    if validation.has_errors() {
        bail!(
            "invalid configuration: {} error(s)",
            validation.count(Severity::Error)
        );
    }

    let locale_name = config.ui.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
    let locale = parse_locale(locale_name)
        .with_context(|| format!("unknown locale \"{locale_name}\""))?;

    let store = Arc::new(build_store(config, log_buffer)?);
    store.add_plugin(Arc::new(WebUiPlugin::new(WebUiInfo {
        listen: format!("{}:{}", config.server.host, config.server.port),
        tls: config.tls.enabled,
        auth_disabled: config.auth.disabled,
        users: config.auth.credentials.len(),
        locale: locale_name.to_owned(),
    })));

    let composition = discover_fragments(store.as_ref())?;
    let fragments = composition.fragment_count();

    let verifier = StaticCredentials::from_pairs(config.auth.credential_pairs());
    let auth = Authenticator::new(Arc::new(verifier)).disabled(config.auth.disabled);
    let gateway = GatewayState::new(composition.navigator, auth, StoreHandle::attached(store))
        .with_locale(locale)
        .with_secure_cookies(config.tls.enabled);
    let app = dashboard_app(AppState::new(gateway), composition.mounts);

    let mut host = ServerHost::new(config.server.host.clone(), config.server.port);
    if config.tls.enabled {
        let manager = FsCertManager::new()?.with_host(config.server.host.clone());
        host = host.with_tls(autodash_tls::server_config(&config.tls, &manager)?);
    }
    host.start(app)?;

    let url = host.url().unwrap_or_default();
    log_startup_banner(
        env!("CARGO_PKG_VERSION"),
        &url,
        fragments,
        loaded.path.as_deref(),
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutting down");
    tokio::task::block_in_place(|| host.stop());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = load(&cli)?;
    let log_buffer = LogBuffer::default();
    init_telemetry(&cli, &loaded.config, log_buffer.clone());

    info!(version = env!("CARGO_PKG_VERSION"), "autodash starting");

    match cli.command {
        None | Some(Commands::Serve) => serve(loaded, log_buffer).await,
        Some(Commands::Check) => check_commands::handle_check(&loaded),
    }
}
