//! Plugin and connector UI composition.
//!
//! Every connector and plugin known to the session store may contribute a
//! [`UiFragment`] through the optional [`ProvidesUi`] capability. At start-up
//! [`discover_and_register`] collects those fragments into per-kind
//! [`FragmentRegistry`]s, mounts their routes in the [`RouteTable`], and hands
//! back a [`Navigator`] that assembles the navigation menu on every request.

pub mod error;
pub mod fragment;
pub mod nav;
pub mod registry;
pub mod routes;

pub use {
    error::{Error, Result},
    fragment::{Endpoint, FragmentKind, FragmentRoutes, NavItem, NavTarget, ProvidesUi, UiFragment},
    nav::{NavEntry, Navigator},
    registry::{
        Composition, FragmentRegistry, Mount, Owner, RegisteredFragment, discover_and_register,
    },
    routes::{RouteTable, endpoints},
};
