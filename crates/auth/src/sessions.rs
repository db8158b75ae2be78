//! In-memory login sessions.

use std::time::{Duration, Instant};

use {dashmap::DashMap, tracing::debug};

/// Lifetime of a "remember me" session.
pub const REMEMBER_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Server-side lifetime of a browser-session login.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: String,
    pub username: String,
    pub remember: bool,
    ttl: Duration,
    expires_at: Instant,
}

impl LoginSession {
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Cookie `Max-Age` to send with this session: the full remember-me
    /// lifetime, or `None` for a browser-session cookie.
    #[must_use]
    pub fn cookie_max_age(&self) -> Option<Duration> {
        self.remember.then_some(self.ttl)
    }
}

pub struct SessionManager {
    sessions: DashMap<String, LoginSession>,
    session_ttl: Duration,
    remember_ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_ttls(SESSION_TTL, REMEMBER_TTL)
    }

    pub fn with_ttls(session_ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            session_ttl,
            remember_ttl,
        }
    }

    /// Start a session for an already verified user.
    pub fn create(&self, username: &str, remember: bool) -> LoginSession {
        let ttl = if remember {
            self.remember_ttl
        } else {
            self.session_ttl
        };
        let session = LoginSession {
            token: generate_token(),
            username: username.to_owned(),
            remember,
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.sessions
            .insert(session.token.clone(), session.clone());
        debug!(user = username, remember, "login session created");
        session
    }

    /// Username owning `token`, if the session exists and has not expired.
    /// Expired sessions are dropped on lookup.
    pub fn validate(&self, token: &str) -> Option<String> {
        let now = Instant::now();
        let username = {
            let session = self.sessions.get(token)?;
            (!session.is_expired(now)).then(|| session.username.clone())
        };
        if username.is_none() {
            self.sessions.remove(token);
        }
        username
    }

    pub fn remove(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn generate_token() -> String {
    use {base64::Engine, rand::RngCore};

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
