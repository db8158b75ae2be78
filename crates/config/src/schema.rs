//! Config schema types.

use std::{collections::BTreeMap, path::PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

/// Root configuration of the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub ui: UiConfig,
    pub tls: TlsConfig,
    pub store: StoreConfig,
    /// Default tracing filter, e.g. `info` or `autodash=debug`. `RUST_LOG`
    /// takes precedence.
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "0.0.0.0".
    pub host: String,
    /// Port to listen on, 1 to 65535. Defaults to 4000.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4000,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn is_localhost(&self) -> bool {
        matches!(self.host.as_str(), "127.0.0.1" | "localhost" | "::1")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Username → password. An empty map means nobody can log in.
    pub credentials: BTreeMap<String, Secret<String>>,
    /// When true, every page is served without login.
    pub disabled: bool,
}

impl AuthConfig {
    /// Plaintext view of the credential map, for building a verifier.
    pub fn credential_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.credentials
            .iter()
            .map(|(user, pass)| (user.as_str(), pass.expose_secret().as_str()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Locale used to format timestamps, e.g. `de_DE`. Defaults to `en_US`.
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Serve HTTPS instead of plain HTTP.
    pub enabled: bool,
    /// Server certificate (PEM). A self-signed pair is generated when both
    /// paths are unset.
    pub cert_path: Option<PathBuf>,
    /// Server private key (PEM).
    pub key_path: Option<PathBuf>,
}

/// Seed data for the in-memory session store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot of vehicles, connectors and plugins.
    pub snapshot: Option<PathBuf>,
}
