use std::sync::Arc;

use canopy_loader::LoadError;
use thiserror::Error;

/// Errors returned by [`MicroAppManager::fetch_micro_app`](crate::MicroAppManager::fetch_micro_app).
///
/// Cloneable because every waiter on a shared load receives the same error.
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
  /// No descriptor is configured for the slug.
  #[error("unknown micro-app: {slug}")]
  UnknownMicroApp { slug: String },

  /// The bundle could not be loaded.
  #[error("failed to load micro-app '{slug}': {source}")]
  Load {
    slug: String,
    #[source]
    source: Arc<LoadError>,
  },

  /// The bundle loader panicked. Treated like any other failed load.
  #[error("loader panicked while loading micro-app '{slug}': {message}")]
  LoaderPanicked { slug: String, message: String },
}

impl ManagerError {
  pub fn slug(&self) -> &str {
    match self {
      Self::UnknownMicroApp { slug }
      | Self::Load { slug, .. }
      | Self::LoaderPanicked { slug, .. } => slug,
    }
  }
}
