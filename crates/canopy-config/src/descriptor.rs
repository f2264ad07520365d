use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a micro-app bundle manifest lives.
///
/// Serialized as a plain string: anything starting with `http://` or `https://`
/// is a URL, everything else is a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BundleLocation {
  Path(PathBuf),
  Url(String),
}

impl BundleLocation {
  pub fn parse(raw: &str) -> Self {
    if raw.starts_with("http://") || raw.starts_with("https://") {
      Self::Url(raw.to_string())
    } else {
      Self::Path(PathBuf::from(raw))
    }
  }

  pub fn is_remote(&self) -> bool {
    matches!(self, Self::Url(_))
  }
}

impl From<String> for BundleLocation {
  fn from(raw: String) -> Self {
    Self::parse(&raw)
  }
}

impl From<BundleLocation> for String {
  fn from(location: BundleLocation) -> Self {
    location.to_string()
  }
}

impl fmt::Display for BundleLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Path(path) => write!(f, "{}", path.display()),
      Self::Url(url) => f.write_str(url),
    }
  }
}

/// Static metadata for a micro-app, supplied by host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroAppDescriptor {
  /// Unique key, e.g. "authorize". Also the name of the micro-app's state slice.
  pub slug: String,

  /// Location of the bundle manifest.
  pub bundle: BundleLocation,

  /// Custom element name the micro-app renders as, e.g. "authorize-app".
  pub html_tag: String,

  /// Micro-app specific configuration, opaque to the host.
  #[serde(default)]
  pub config: serde_json::Value,
}

impl MicroAppDescriptor {
  pub fn new(
    slug: impl Into<String>,
    bundle: BundleLocation,
    html_tag: impl Into<String>,
  ) -> Self {
    Self {
      slug: slug.into(),
      bundle,
      html_tag: html_tag.into(),
      config: serde_json::Value::Null,
    }
  }

  pub fn with_config(mut self, config: serde_json::Value) -> Self {
    self.config = config;
    self
  }
}
