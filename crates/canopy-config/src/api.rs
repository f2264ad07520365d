use serde::{Deserialize, Serialize};

/// API settings shared by the host and every mounted micro-app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
  /// Default base URL micro-apps should issue requests against.
  pub base_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost".to_string(),
    }
  }
}
