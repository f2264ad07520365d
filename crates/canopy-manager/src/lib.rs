//! Canopy Manager
//!
//! Loads micro-app bundles on demand and caches them for the life of the host.
//!
//! # Single-flight
//!
//! ```text
//! fetch_micro_app("authorize")
//! ├── Ready(package)        -> return it, no loader call
//! ├── Loading(shared)       -> await the same in-flight load
//! └── absent                -> start a load, park it as Loading
//!                              ├── Ok  -> Ready(package), wake every waiter
//!                              └── Err -> remove entry, reject every waiter
//! ```
//!
//! A failed load leaves no cache entry, so the next call retries. A successful
//! one is never evicted.

mod error;
mod manager;
mod package;

pub use error::ManagerError;
pub use manager::MicroAppManager;
pub use package::{LoadedPackage, merge_config};
