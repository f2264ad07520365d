use thiserror::Error;

/// Raised by a micro-app's `init`.
#[derive(Debug, Clone, Error)]
pub enum InitError {
  /// The micro-app refused to initialize.
  #[error("{message}")]
  Failed {
    message: String,
    detail: Option<String>,
  },

  /// The micro-app's configuration is unusable.
  #[error("invalid configuration: {message}")]
  InvalidConfig { message: String },
}

impl InitError {
  pub fn failed(message: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
      detail: None,
    }
  }

  pub fn with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::Failed {
      message: message.into(),
      detail: Some(detail.into()),
    }
  }

  pub fn invalid_config(message: impl Into<String>) -> Self {
    Self::InvalidConfig {
      message: message.into(),
    }
  }

  /// Diagnostic detail, if the micro-app supplied any.
  pub fn detail(&self) -> Option<&str> {
    match self {
      Self::Failed { detail, .. } => detail.as_deref(),
      Self::InvalidConfig { .. } => None,
    }
  }
}
