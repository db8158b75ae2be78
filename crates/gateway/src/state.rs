use std::sync::{Arc, OnceLock};

use {
    autodash_auth::Authenticator,
    autodash_plugins::Navigator,
    autodash_sessions::SessionStore,
    chrono::Locale,
};

use crate::restart::{ExecRestarter, Restarter};

/// Non-owning slot for the session store.
///
/// The dashboard can start before the aggregator hands over its store;
/// handlers treat an empty slot as "not ready yet". Once attached the store
/// stays for the lifetime of the server.
#[derive(Clone, Default)]
pub struct StoreHandle(Arc<OnceLock<Arc<dyn SessionStore>>>);

impl StoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(store: Arc<dyn SessionStore>) -> Self {
        let handle = Self::new();
        handle.attach(store);
        handle
    }

    /// Attach the store. Returns `false` if one was already attached.
    pub fn attach(&self, store: Arc<dyn SessionStore>) -> bool {
        self.0.set(store).is_ok()
    }

    pub fn get(&self) -> Option<Arc<dyn SessionStore>> {
        self.0.get().cloned()
    }

    pub fn is_attached(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Everything the request handlers share. Read-only after start-up.
pub struct GatewayState {
    /// Version of the dashboard itself.
    pub version: String,
    pub store: StoreHandle,
    pub navigator: Arc<Navigator>,
    pub auth: Arc<Authenticator>,
    /// Locale used for timestamps in rendered pages.
    pub locale: Locale,
    /// Mark session cookies `Secure` (set when serving HTTPS).
    pub secure_cookies: bool,
    pub restarter: Arc<dyn Restarter>,
}

impl GatewayState {
    pub fn new(navigator: Navigator, auth: Authenticator, store: StoreHandle) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            store,
            navigator: Arc::new(navigator),
            auth: Arc::new(auth),
            locale: Locale::en_US,
            secure_cookies: false,
            restarter: Arc::new(ExecRestarter),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_restarter(mut self, restarter: Arc<dyn Restarter>) -> Self {
        self.restarter = restarter;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

impl AppState {
    pub fn new(gateway: GatewayState) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}
