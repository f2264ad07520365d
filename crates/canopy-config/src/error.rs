use thiserror::Error;

/// Errors raised while validating a host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Two descriptors share the same slug.
  #[error("duplicate micro-app slug: {slug}")]
  DuplicateSlug { slug: String },

  /// A descriptor field is empty or malformed.
  #[error("invalid micro-app '{slug}': {message}")]
  InvalidDescriptor { slug: String, message: String },

  /// The configuration document could not be parsed.
  #[error("invalid host configuration: {0}")]
  Parse(#[from] serde_json::Error),
}
