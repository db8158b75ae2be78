//! Error plumbing shared by the autodash crates.

pub mod context;

pub use context::{Context, ContextError};
