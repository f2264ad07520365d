use thiserror::Error;

/// Errors that can occur while loading a micro-app bundle.
#[derive(Debug, Error)]
pub enum LoadError {
  /// Nothing exists at the bundle location.
  #[error("bundle not found for '{slug}' at {location}")]
  NotFound { slug: String, location: String },

  /// IO error reading a bundle from disk.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The manifest is not valid JSON or misses fields.
  #[error("invalid manifest: {0}")]
  InvalidManifest(#[from] serde_json::Error),

  /// The bundle server answered with a non-success status.
  #[error("bundle request for '{slug}' failed with status {status}")]
  HttpStatus { slug: String, status: u16 },

  /// Transport-level HTTP failure.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The manifest entry names a module the host does not ship.
  #[error("unknown entry '{entry}' in bundle '{slug}'")]
  UnknownEntry { slug: String, entry: String },

  /// The loader cannot handle this kind of location.
  #[error("unsupported bundle location for '{slug}': {location}")]
  UnsupportedLocation { slug: String, location: String },
}
