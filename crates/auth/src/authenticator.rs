use std::sync::Arc;

use tracing::debug;

use crate::{
    headers::{SESSION_COOKIE, parse_basic, parse_cookie},
    sessions::{LoginSession, SessionManager},
    verifier::CredentialVerifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Session cookie from a form login.
    Session,
    /// `Authorization: Basic` header.
    Basic,
    /// Authentication is disabled in the config.
    Disabled,
}

/// Who made a request and how they proved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub username: String,
    pub method: AuthMethod,
}

/// Ties credential verification and login sessions together.
pub struct Authenticator {
    verifier: Arc<dyn CredentialVerifier>,
    sessions: SessionManager,
    disabled: bool,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            verifier,
            sessions: SessionManager::new(),
            disabled: false,
        }
    }

    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    /// Let every request through without credentials.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Verify a form login and start a session on success.
    pub fn login(&self, username: &str, password: &str, remember: bool) -> Option<LoginSession> {
        if !self.verifier.verify(username, password) {
            debug!(user = username, "login rejected");
            return None;
        }
        Some(self.sessions.create(username, remember))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.remove(token)
    }

    /// Resolve the caller from raw `Cookie` and `Authorization` header
    /// values. A valid session cookie wins over Basic credentials. Rejected
    /// Basic credentials yield `None`, never an error.
    pub fn identify(&self, cookie: Option<&str>, authorization: Option<&str>) -> Option<AuthIdentity> {
        if self.disabled {
            return Some(AuthIdentity {
                username: String::new(),
                method: AuthMethod::Disabled,
            });
        }

        if let Some(token) = cookie.and_then(|c| parse_cookie(c, SESSION_COOKIE))
            && let Some(username) = self.sessions.validate(token)
        {
            return Some(AuthIdentity {
                username,
                method: AuthMethod::Session,
            });
        }

        let (username, password) = authorization.and_then(parse_basic)?;
        if self.verifier.verify(&username, &password) {
            Some(AuthIdentity {
                username,
                method: AuthMethod::Basic,
            })
        } else {
            debug!(user = %username, "basic credentials rejected");
            None
        }
    }
}
