//! Canopy Module
//!
//! The contract between the host runtime and a micro-app.
//!
//! # Lifecycle
//!
//! ```text
//! MicroAppModule::init(HostContext) -> InitOutcome { dom_type }   once per mount
//! MicroAppModule::create_element(html_tag) -> MicroAppElement     once per mount
//! MicroAppElement::update(MountContext)                           on every host change
//! MicroAppElement::unmount()                                      when the slot goes away
//! ```
//!
//! `init` receives a [`HostContext`] carrying the mount tag, the micro-app's own
//! configuration and a [`ReducerRegistrar`] bound to its slug, so whatever the
//! micro-app registers lands in its own slice of the shared store.

mod context;
mod error;
mod host;
mod module;

pub use context::{AccessTokenSource, ApiContext, MountContext, RoutingContext};
pub use error::InitError;
pub use host::{HostContext, ReducerRegistrar};
pub use module::{DomType, InitOutcome, MicroAppElement, MicroAppModule};
