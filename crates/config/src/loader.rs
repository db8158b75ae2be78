use std::path::{Path, PathBuf};

use {serde_json::Value, tracing::debug};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::DashboardConfig,
    validate::{Diagnostic, Severity, validate_document},
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "autodash.toml",
    "autodash.yaml",
    "autodash.yml",
    "autodash.json",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        match ext {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_owned(),
            }),
        }
    }

    /// Parse into a format-neutral JSON tree.
    fn parse_value(self, raw: &str) -> std::result::Result<Value, String> {
        match self {
            Self::Toml => toml::from_str::<toml::Value>(raw)
                .map_err(|e| e.to_string())
                .and_then(|v| serde_json::to_value(v).map_err(|e| e.to_string())),
            Self::Yaml => serde_yaml::from_str::<Value>(raw).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
        }
    }
}

/// A parsed config plus where it came from and any non-fatal diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: DashboardConfig,
    pub path: Option<PathBuf>,
    pub warnings: Vec<Diagnostic>,
}

/// Parse a config document. Unknown fields and type errors are fatal.
pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<(DashboardConfig, Vec<Diagnostic>)> {
    let raw = substitute_env(raw);
    let invalid = |diagnostics| Error::Invalid {
        path: None,
        diagnostics,
    };

    let value = format
        .parse_value(&raw)
        .map_err(|e| invalid(vec![Diagnostic::error("", format!("syntax error: {e}"))]))?;
    // An empty YAML document parses as null.
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };

    let structural = validate_document(&value);
    if structural.has_errors() {
        return Err(invalid(structural.diagnostics));
    }

    let config: DashboardConfig = serde_json::from_value(value)
        .map_err(|e| invalid(vec![Diagnostic::error("", format!("type error: {e}"))]))?;

    let warnings = structural
        .diagnostics
        .into_iter()
        .filter(|d| d.severity != Severity::Error)
        .collect();
    Ok((config, warnings))
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    let format = ConfigFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (config, warnings) = parse_config(&raw, format).map_err(|e| match e {
        Error::Invalid { diagnostics, .. } => Error::Invalid {
            path: Some(path.to_path_buf()),
            diagnostics,
        },
        other => other,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(LoadedConfig {
        config,
        path: Some(path.to_path_buf()),
        warnings,
    })
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./autodash.{toml,yaml,yml,json}` (working directory)
/// 2. `~/.config/autodash/autodash.{toml,yaml,yml,json}` (user-global)
///
/// Returns defaults if no config file is found. A file that exists but fails
/// to parse is an error.
pub fn discover_and_load() -> Result<LoadedConfig> {
    match find_config_file() {
        Some(path) => load_config(&path),
        None => {
            debug!("no config file found, using defaults");
            Ok(LoadedConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/autodash/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "autodash").map(|d| d.config_dir().to_path_buf())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn parses_toml() {
        let (config, warnings) = parse_config(
            r#"
log_level = "debug"

[server]
host = "127.0.0.1"
port = 8080

[auth.credentials]
admin = "secret"

[ui]
locale = "de_DE"
"#,
            ConfigFormat::Toml,
        )
        .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.auth.credentials["admin"].expose_secret(),
            "secret"
        );
        assert_eq!(config.ui.locale.as_deref(), Some("de_DE"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn parses_yaml_and_json() {
        let (yaml, _) = parse_config("server:\n  port: 4100\n", ConfigFormat::Yaml).unwrap();
        assert_eq!(yaml.server.port, 4100);
        assert_eq!(yaml.server.host, "0.0.0.0");

        let (json, _) =
            parse_config(r#"{"tls": {"enabled": true}}"#, ConfigFormat::Json).unwrap();
        assert!(json.tls.enabled);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let (config, _) = parse_config("", ConfigFormat::Yaml).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn out_of_range_port_is_type_error() {
        let err = parse_config("[server]\nport = 70000\n", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
        assert!(err.to_string().contains("type error"), "{err}");
    }

    #[test]
    fn unknown_field_is_fatal() {
        let err = parse_config("[server]\nprot = 1\n", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("server.prot"), "{err}");
    }

    #[test]
    fn syntax_error_is_fatal() {
        let err = parse_config("not valid [[[", ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("syntax error"), "{err}");
    }

    #[test]
    fn unsupported_extension() {
        let err = ConfigFormat::from_path(Path::new("autodash.ini")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn load_from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodash.json");
        std::fs::write(&path, r#"{"server": {"port": 4321}}"#).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.config.server.port, 4321);
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(find_in(dir.path()), Some(path));
    }

    #[test]
    fn invalid_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autodash.toml");
        std::fs::write(&path, "bogus = 1\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("autodash.toml"), "{err}");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_config(Path::new("/nonexistent/autodash.toml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
