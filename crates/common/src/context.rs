//! `.context()` for any `Result` or `Option`.
//!
//! Failures become a [`ContextError`] carrying one message. Crate error types
//! implement `From<ContextError>` so the result can be propagated with `?`.

use std::fmt::Display;

/// A failure described by what was being attempted, plus the source error's
/// message when there was one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ContextError {
    message: String,
}

impl ContextError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn wrap(context: impl Display, source: impl Display) -> Self {
        Self::new(format!("{context}: {source}"))
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}

pub trait Context<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ContextError>;

    /// Like [`Context::context`], but the message is only built on failure.
    fn with_context<C, F>(self, f: F) -> Result<T, ContextError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: Display> Context<T> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ContextError> {
        self.map_err(|source| ContextError::wrap(context.into(), source))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ContextError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| ContextError::wrap(f().into(), source))
    }
}

/// `None` has no source, so the context alone is the message.
impl<T> Context<T> for Option<T> {
    fn context(self, context: impl Into<String>) -> Result<T, ContextError> {
        self.ok_or_else(|| ContextError::new(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ContextError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| ContextError::new(f()))
    }
}
