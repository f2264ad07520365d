//! Canopy Host
//!
//! Composes the runtime around a host configuration. [`HostProviders::start`]
//! brings the pieces up in a fixed order:
//!
//! 1. the store, with the static `router` and `session` slices;
//! 2. the [`RequestLayer`], wired to one [`AuthStrategy`] and one token accessor;
//! 3. the persisted [`Session`], if any (`session/restored`);
//! 4. the location sync between the host router and the store.
//!
//! The resulting [`Host`] mounts micro-apps into slots and owns everything
//! until [`Host::shutdown`].

mod auth;
mod error;
mod location;
mod providers;
mod request;
mod session;
pub mod slices;

pub use auth::{AuthStrategy, BearerAuth, Credentials};
pub use error::HostError;
pub use location::{LocationSync, apply_navigation};
pub use providers::{Host, HostProviders};
pub use request::{RequestLayer, SessionTokens};
pub use session::{FsSessionStore, MemorySessionStore, Session, SessionStore};
