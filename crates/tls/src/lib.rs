//! TLS setup for the dashboard.
//!
//! Either loads a configured certificate/key pair, or generates a
//! self-signed pair on first use and keeps it under
//! `~/.config/autodash/certs/` for later runs.

pub mod error;

use std::{
    io::BufReader,
    net::IpAddr,
    path::{Path, PathBuf},
    time::SystemTime,
};

use {
    autodash_config::TlsConfig,
    rcgen::{CertificateParams, DnType, KeyPair, SanType},
    rustls::ServerConfig,
    time::OffsetDateTime,
    tracing::info,
};

pub use error::{Error, Result};

use crate::error::Context;

/// Regenerate the self-signed certificate once it is older than this.
const REGENERATE_AFTER_DAYS: u64 = 300;
const VALIDITY_DAYS: i64 = 365;

/// Paths of a PEM certificate and its private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPair {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Source of the server certificate, allowing alternative implementations.
pub trait CertManager: Send + Sync {
    /// Returns a usable certificate pair, generating one if needed.
    fn ensure_certs(&self) -> Result<CertPair>;
}

/// Self-signed certificates persisted in a directory.
pub struct FsCertManager {
    cert_dir: PathBuf,
    hosts: Vec<String>,
}

impl FsCertManager {
    /// Use the default certificate directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(cert_dir()?))
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self {
            cert_dir: dir,
            hosts: vec!["localhost".into()],
        }
    }

    /// Add a host name or IP address the certificate should be valid for.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        if !host.is_empty() && !self.hosts.contains(&host) {
            self.hosts.push(host);
        }
        self
    }
}

/// Returns the certificate storage directory (`~/.config/autodash/certs/`).
pub fn cert_dir() -> Result<PathBuf> {
    let dir = autodash_config::config_dir()
        .unwrap_or_else(|| PathBuf::from(".autodash"))
        .join("certs");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(dir)
}

impl CertManager for FsCertManager {
    fn ensure_certs(&self) -> Result<CertPair> {
        let pair = CertPair {
            cert: self.cert_dir.join("server.pem"),
            key: self.cert_dir.join("server-key.pem"),
        };

        if !pair.key.exists() || is_stale(&pair.cert, REGENERATE_AFTER_DAYS) {
            info!(hosts = ?self.hosts, "generating self-signed TLS certificate");
            let (cert_pem, key_pem) = generate_self_signed(&self.hosts)?;
            std::fs::create_dir_all(&self.cert_dir)?;
            std::fs::write(&pair.cert, cert_pem)?;
            std::fs::write(&pair.key, key_pem)?;
            info!(dir = %self.cert_dir.display(), "certificate written");
        }

        Ok(pair)
    }
}

fn is_stale(path: &Path, days: u64) -> bool {
    let Ok(modified) = std::fs::metadata(path).and_then(|m| m.modified()) else {
        return true;
    };
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or_default();
    age > time::Duration::days(days as i64).unsigned_abs()
}

/// Generate a self-signed server certificate. Returns (cert, key) PEM strings.
fn generate_self_signed(hosts: &[String]) -> Result<(String, String)> {
    let now = OffsetDateTime::now_utc();
    let key = KeyPair::generate()?;

    let mut params = CertificateParams::new(Vec::<String>::new())?;
    params
        .distinguished_name
        .push(DnType::CommonName, hosts.first().map_or("localhost", String::as_str));
    params
        .distinguished_name
        .push(DnType::OrganizationName, "autodash");

    let mut sans = vec![
        SanType::IpAddress(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)),
        SanType::IpAddress(IpAddr::V6(std::net::Ipv6Addr::LOCALHOST)),
    ];
    for host in hosts {
        match host.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() => {},
            Ok(ip) => sans.push(SanType::IpAddress(ip)),
            Err(_) => sans.push(SanType::DnsName(host.as_str().try_into()?)),
        }
    }
    params.subject_alt_names = sans;
    params.not_before = now;
    params.not_after = now + time::Duration::days(VALIDITY_DAYS);

    let cert = params.self_signed(&key)?;
    Ok((cert.pem(), key.serialize_pem()))
}

/// Load cert + key PEM files into a `rustls::ServerConfig`.
pub fn load_rustls_config(pair: &CertPair) -> Result<ServerConfig> {
    // Ensure a crypto provider is installed (ring via feature flag).
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cert_file = std::fs::File::open(&pair.cert)
        .with_context(|| format!("open server cert {}", pair.cert.display()))?;
    let key_file = std::fs::File::open(&pair.key)
        .with_context(|| format!("open server key {}", pair.key.display()))?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("parse certs")?;
    if certs.is_empty() {
        return Err(Error::message(format!(
            "no certificate found in {}",
            pair.cert.display()
        )));
    }

    let key = rustls_pemfile::private_key(&mut BufReader::new(key_file))
        .context("parse private key")?
        .context("no private key found")?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    Ok(config)
}

/// Build the server TLS configuration from the `tls` config section.
///
/// A configured cert/key pair is used as-is. Without one, `manager` supplies
/// a self-signed pair.
pub fn server_config(config: &TlsConfig, manager: &dyn CertManager) -> Result<ServerConfig> {
    let pair = match (&config.cert_path, &config.key_path) {
        (Some(cert), Some(key)) => CertPair {
            cert: cert.clone(),
            key: key.clone(),
        },
        (None, None) => manager.ensure_certs()?,
        _ => {
            return Err(Error::message(
                "tls.cert_path and tls.key_path must be set together",
            ));
        },
    };
    info!(cert = %pair.cert.display(), "loading TLS certificate");
    load_rustls_config(&pair)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pems_are_valid() {
        let (cert, key) = generate_self_signed(&["localhost".into()]).unwrap();
        assert!(cert.contains("BEGIN CERTIFICATE"));
        assert!(key.contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn hosts_may_be_ips_or_names() {
        let hosts = vec!["localhost".into(), "192.168.1.10".into(), "0.0.0.0".into()];
        assert!(generate_self_signed(&hosts).is_ok());
    }

    #[test]
    fn certs_persist_and_are_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = FsCertManager::with_dir(tmp.path().to_path_buf()).with_host("dash.local");
        let first = mgr.ensure_certs().unwrap();
        assert!(first.cert.exists());
        assert!(first.key.exists());
        let mtime1 = std::fs::metadata(&first.cert).unwrap().modified().unwrap();

        let second = mgr.ensure_certs().unwrap();
        let mtime2 = std::fs::metadata(&second.cert).unwrap().modified().unwrap();
        assert_eq!(first, second);
        assert_eq!(mtime1, mtime2);
    }

    #[test]
    fn server_config_from_generated_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let mgr = FsCertManager::with_dir(tmp.path().to_path_buf());
        let config = server_config(&TlsConfig::default(), &mgr).unwrap();
        assert_eq!(config.alpn_protocols[1], b"http/1.1");
    }

    #[test]
    fn server_config_from_explicit_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let pair = FsCertManager::with_dir(tmp.path().join("gen"))
            .ensure_certs()
            .unwrap();

        let tls = TlsConfig {
            enabled: true,
            cert_path: Some(pair.cert),
            key_path: Some(pair.key),
        };
        let unused = FsCertManager::with_dir(tmp.path().join("unused"));
        assert!(server_config(&tls, &unused).is_ok());
        assert!(!tmp.path().join("unused").exists());
    }

    #[test]
    fn half_configured_pair_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let tls = TlsConfig {
            enabled: true,
            cert_path: Some(tmp.path().join("cert.pem")),
            key_path: None,
        };
        let mgr = FsCertManager::with_dir(tmp.path().to_path_buf());
        assert!(server_config(&tls, &mgr).is_err());
    }

    #[test]
    fn missing_file_error_names_path() {
        let err = load_rustls_config(&CertPair {
            cert: "/nonexistent/cert.pem".into(),
            key: "/nonexistent/key.pem".into(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cert.pem"));
    }

    #[test]
    fn stale_when_missing() {
        assert!(is_stale(Path::new("/nonexistent/file.pem"), 30));
    }
}
