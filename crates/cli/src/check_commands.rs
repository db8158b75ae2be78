//! `autodash check`: validate the configuration without starting the server.
//!
//! Prints a report with `[ok]`, `[warn]`, `[fail]` or `[info]` per item and
//! exits non-zero when anything failed.

use std::path::Path;

use {
    anyhow::Result,
    autodash_config::{DashboardConfig, LoadedConfig, Severity, parse_locale},
    autodash_sessions::Snapshot,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Fail,
            Severity::Warning => Self::Warn,
            Severity::Info => Self::Info,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }

    fn count(&self, status: Status) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
        }
        eprintln!();
    }

    let errors = sections.iter().map(|s| s.count(Status::Fail)).sum();
    let warnings = sections.iter().map(|s| s.count(Status::Warn)).sum();
    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

pub fn handle_check(loaded: &LoadedConfig) -> Result<()> {
    eprintln!("{BOLD}autodash check{RESET}");
    eprintln!("{BOLD}=============={RESET}\n");

    let config = &loaded.config;
    let sections = [
        check_config(loaded),
        check_auth(config),
        check_tls(config),
        check_store(config),
    ];

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── Checks ──────────────────────────────────────────────────────────────────

fn check_config(loaded: &LoadedConfig) -> Section {
    let label = loaded
        .path
        .as_ref()
        .map_or_else(|| "defaults".to_owned(), |p| p.display().to_string());
    let mut section = Section::new(format!("Config ({label})"));

    for warning in &loaded.warnings {
        section.push(warning.severity.into(), warning.to_string());
    }

    let config = &loaded.config;
    let result = config.validate();
    for diagnostic in &result.diagnostics {
        section.push(diagnostic.severity.into(), diagnostic.to_string());
    }

    section.push(
        Status::Info,
        format!("listen: {}:{}", config.server.host, config.server.port),
    );
    let locale = config.ui.locale.as_deref().unwrap_or("en_US");
    if parse_locale(locale).is_some() {
        section.push(Status::Ok, format!("locale: {locale}"));
    }
    if !result.has_errors() {
        section.push(Status::Ok, "configuration is valid");
    }
    section
}

fn check_auth(config: &DashboardConfig) -> Section {
    let mut section = Section::new("Authentication");
    if config.auth.disabled {
        let status = if config.server.is_localhost() {
            Status::Info
        } else {
            Status::Warn
        };
        section.push(status, "login is disabled, every page is public");
        return section;
    }

    match config.auth.credentials.len() {
        0 => section.push(Status::Warn, "no users configured"),
        n => section.push(Status::Ok, format!("{n} user(s) configured")),
    }
    for (user, password) in config.auth.credential_pairs() {
        if password.is_empty() {
            section.push(Status::Warn, format!("user \"{user}\" has an empty password"));
        }
    }
    section
}

fn check_tls(config: &DashboardConfig) -> Section {
    let mut section = Section::new("TLS");
    if !config.tls.enabled {
        let status = if config.server.is_localhost() {
            Status::Info
        } else {
            Status::Warn
        };
        section.push(status, "serving plain HTTP");
        return section;
    }

    match (&config.tls.cert_path, &config.tls.key_path) {
        (Some(cert), Some(key)) => {
            for (name, path) in [("certificate", cert), ("private key", key)] {
                if path.exists() {
                    section.push(Status::Ok, format!("{name}: {}", path.display()));
                } else {
                    section.push(Status::Fail, format!("{name} not found: {}", path.display()));
                }
            }
        },
        (None, None) => match autodash_tls::cert_dir() {
            Ok(dir) => section.push(
                Status::Info,
                format!("self-signed certificate kept in {}", dir.display()),
            ),
            Err(e) => section.push(Status::Fail, format!("no certificate directory: {e}")),
        },
        _ => section.push(Status::Fail, "cert_path and key_path must be set together"),
    }
    section
}

fn check_store(config: &DashboardConfig) -> Section {
    let mut section = Section::new("Session store");
    let Some(path) = &config.store.snapshot else {
        section.push(Status::Info, "no snapshot configured, starting empty");
        return section;
    };
    check_snapshot(path, &mut section);
    section
}

fn check_snapshot(path: &Path, section: &mut Section) {
    match Snapshot::load(path) {
        Ok(snapshot) => section.push(
            Status::Ok,
            format!(
                "snapshot {}: {} vehicle(s), {} connector(s), {} plugin(s)",
                path.display(),
                snapshot.vehicles.len(),
                snapshot.connectors.len(),
                snapshot.plugins.len()
            ),
        ),
        Err(e) => section.push(Status::Fail, format!("snapshot {}: {e}", path.display())),
    }
}
