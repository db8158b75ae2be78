//! Authentication for the dashboard.
//!
//! This crate provides:
//! - [`CredentialVerifier`]: pluggable username/password check, with the
//!   in-memory [`StaticCredentials`] as the default
//! - [`SessionManager`]: in-memory login sessions keyed by random tokens
//! - [`Authenticator`]: resolves a request's cookie or `Authorization: Basic`
//!   header to an [`AuthIdentity`]

pub mod authenticator;
pub mod headers;
pub mod sessions;
pub mod verifier;

pub use {
    authenticator::{AuthIdentity, AuthMethod, Authenticator},
    headers::{SESSION_COOKIE, clear_session_cookie, parse_basic, parse_cookie, session_cookie},
    sessions::{LoginSession, SessionManager},
    verifier::{CredentialVerifier, StaticCredentials},
};
