//! Server host for the dashboard: shared application state, the login gate,
//! access logging, health and restart endpoints, and the dedicated-thread
//! HTTP(S) accept loop.
//!
//! Page handlers live in `autodash-web`, which builds its routers against
//! [`AppState`] and hands them to [`build_gateway_app`].

pub mod access_log;
pub mod auth_middleware;
pub mod error;
pub mod health;
pub mod restart;
pub mod server;
pub mod state;

pub use {
    error::{Error, Result},
    server::{ServerHost, build_gateway_app, log_startup_banner},
    state::{AppState, GatewayState, StoreHandle},
};
