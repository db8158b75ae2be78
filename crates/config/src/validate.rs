//! Configuration validation.
//!
//! Detects unknown or misspelled fields in the raw document, then runs
//! semantic checks on the parsed [`DashboardConfig`].

use std::{collections::HashMap, fmt, path::PathBuf};

use serde_json::Value;

use crate::{locale::parse_locale, schema::DashboardConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "server.port". Empty for document-level problems.
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(severity: Severity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, path, message)
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, path, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    /// Dynamic keys with scalar values (e.g. `auth.credentials`).
    Map,
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Map, Struct};

    Struct(HashMap::from([
        (
            "server",
            Struct(HashMap::from([("host", Leaf), ("port", Leaf)])),
        ),
        (
            "auth",
            Struct(HashMap::from([("credentials", Map), ("disabled", Leaf)])),
        ),
        ("ui", Struct(HashMap::from([("locale", Leaf)]))),
        (
            "tls",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("cert_path", Leaf),
                ("key_path", Leaf),
            ])),
        ),
        ("store", Struct(HashMap::from([("snapshot", Leaf)]))),
        ("log_level", Leaf),
    ]))
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

fn suggest<'a>(needle: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn check_unknown_fields(
    value: &Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (Value::Object(map), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };

    let mut known: Vec<&str> = fields.keys().copied().collect();
    known.sort_unstable();
    for (key, child) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match fields.get(key.as_str()) {
            Some(child_schema) => check_unknown_fields(child, child_schema, &path, diagnostics),
            None => {
                let message = match suggest(key, &known) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_owned(),
                };
                diagnostics.push(Diagnostic::error(path, message));
            },
        }
    }
}

/// Check a raw document (already converted to JSON) for unknown fields.
pub fn validate_document(document: &Value) -> ValidationResult {
    let mut diagnostics = Vec::new();
    check_unknown_fields(document, &build_schema_map(), "", &mut diagnostics);
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

impl DashboardConfig {
    /// Semantic checks on a parsed config. Run again after CLI overrides are
    /// applied.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut diagnostics = Vec::new();

        if self.server.port == 0 {
            diagnostics.push(Diagnostic::error(
                "server.port",
                "port must be between 1 and 65535",
            ));
        }
        if self.server.host.trim().is_empty() {
            diagnostics.push(Diagnostic::error("server.host", "host must not be empty"));
        }

        if let Some(locale) = &self.ui.locale
            && parse_locale(locale).is_none()
        {
            diagnostics.push(Diagnostic::error(
                "ui.locale",
                format!("unknown locale \"{locale}\""),
            ));
        }

        if self.auth.disabled {
            if !self.server.is_localhost() {
                diagnostics.push(Diagnostic::warning(
                    "auth",
                    format!(
                        "authentication is disabled while binding to {}",
                        self.server.host
                    ),
                ));
            }
        } else if self.auth.credentials.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "auth.credentials",
                "no credentials configured; nobody will be able to log in",
            ));
        }

        if self.tls.enabled {
            match (&self.tls.cert_path, &self.tls.key_path) {
                (Some(_), None) => diagnostics.push(Diagnostic::error(
                    "tls",
                    "cert_path is set but key_path is missing",
                )),
                (None, Some(_)) => diagnostics.push(Diagnostic::error(
                    "tls",
                    "key_path is set but cert_path is missing",
                )),
                _ => {},
            }
            for (name, path) in [
                ("tls.cert_path", &self.tls.cert_path),
                ("tls.key_path", &self.tls.key_path),
            ] {
                if let Some(path) = path
                    && !path.exists()
                {
                    diagnostics.push(Diagnostic::error(
                        name,
                        format!("file not found: {}", path.display()),
                    ));
                }
            }
        }

        if let Some(snapshot) = &self.store.snapshot
            && !snapshot.exists()
        {
            diagnostics.push(Diagnostic::error(
                "store.snapshot",
                format!("file not found: {}", snapshot.display()),
            ));
        }

        ValidationResult {
            diagnostics,
            config_path: None,
        }
    }
}
