//! Session store: the live vehicle, connector and plugin state the dashboard
//! renders.
//!
//! The dashboard only ever reads through the [`SessionStore`] trait. The
//! [`MemorySessionStore`] is the in-process implementation the binary builds
//! on behalf of the aggregator, optionally seeded from a JSON snapshot.

pub mod error;
pub mod logs;
pub mod model;
pub mod owner;
pub mod snapshot;
pub mod store;

pub use {
    error::{Error, Result},
    logs::{LogBuffer, LogCaptureLayer, LogRecord},
    model::{Attribute, Garage, Vehicle},
    owner::{Connector, OwnerRecord, Plugin},
    snapshot::Snapshot,
    store::{MemorySessionStore, SessionStore},
};
