//! Canopy Config
//!
//! Serializable configuration for a canopy host. A host configuration lists the
//! micro-apps the shell knows about (their [`MicroAppDescriptor`]s) and the API
//! settings that are pushed into every mounted micro-app.
//!
//! Configuration is usually loaded from a JSON file:
//!
//! ```json
//! {
//!   "api": { "base_url": "https://api.example.com" },
//!   "initial_path": "/",
//!   "micro_apps": [
//!     {
//!       "slug": "authorize",
//!       "bundle": "https://cdn.example.com/authorize/manifest.json",
//!       "html_tag": "authorize-app",
//!       "config": { "theme": "dark" }
//!     }
//!   ]
//! }
//! ```

mod api;
mod descriptor;
mod error;
mod host;

pub use api::ApiConfig;
pub use descriptor::{BundleLocation, MicroAppDescriptor};
pub use error::ConfigError;
pub use host::HostConfig;
