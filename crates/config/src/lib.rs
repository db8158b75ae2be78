//! Configuration loading, validation and env substitution.
//!
//! Config files: `autodash.toml`, `autodash.yaml`, `autodash.yml` or
//! `autodash.json`, searched in `./` then `~/.config/autodash/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod locale;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{ConfigFormat, LoadedConfig, config_dir, discover_and_load, find_config_file, load_config},
    locale::parse_locale,
    schema::{AuthConfig, DashboardConfig, ServerConfig, StoreConfig, TlsConfig, UiConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
