//! Canopy Loader
//!
//! Turns a [`MicroAppDescriptor`](canopy_config::MicroAppDescriptor) into a
//! [`RawModule`]: the bundle manifest plus the module its `entry` names in the
//! host's [`ModuleCatalog`].
//!
//! A bundle location is either a directory / file on disk or an HTTP(S) URL:
//!
//! ```text
//! {root}/authorize/
//! └── manifest.json   { "name": "authorize", "version": "1.2.0", "entry": "authorize", "config": {} }
//!
//! https://cdn.example.com/authorize/manifest.json
//! ```
//!
//! [`StandardBundleLoader`] picks the filesystem or HTTP loader by location.

mod catalog;
mod error;
mod fs_loader;
mod http_loader;
mod loader;
mod manifest;

pub use catalog::ModuleCatalog;
pub use error::LoadError;
pub use fs_loader::FsBundleLoader;
pub use http_loader::HttpBundleLoader;
pub use loader::{BundleLoader, RawModule, StandardBundleLoader};
pub use manifest::BundleManifest;
