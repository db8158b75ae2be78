use thiserror::Error;

use crate::fragment::FragmentKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "duplicate {kind} route prefix '{prefix}': already mounted by '{existing}', requested by '{owner}'"
    )]
    DuplicateRoutePrefix {
        kind: FragmentKind,
        prefix: String,
        existing: String,
        owner: String,
    },

    #[error("invalid {kind} route prefix '{prefix}' for '{owner}': {reason}")]
    InvalidRoutePrefix {
        kind: FragmentKind,
        prefix: String,
        owner: String,
        reason: &'static str,
    },

    #[error("duplicate {kind} owner id '{owner}'")]
    DuplicateOwner { kind: FragmentKind, owner: String },

    #[error("invalid endpoint '{name}' in {kind} fragment '{owner}': {reason}")]
    InvalidEndpoint {
        kind: FragmentKind,
        owner: String,
        name: String,
        reason: &'static str,
    },

    #[error("cannot resolve endpoint '{name}' ({scope})")]
    UnresolvedEndpoint { scope: String, name: String },
}

impl Error {
    /// Errors raised while composing the UI at start-up. These must abort
    /// start-up before the server accepts a connection.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::UnresolvedEndpoint { .. })
    }

    pub(crate) fn unresolved(kind: Option<FragmentKind>, name: &str) -> Self {
        let scope = match kind {
            Some(kind) => format!("{kind} mounts"),
            None => "core endpoints".to_owned(),
        };
        Self::UnresolvedEndpoint {
            scope,
            name: name.to_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
