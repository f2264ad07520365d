use canopy_config::ConfigError;
use thiserror::Error;

/// Errors raised while starting or driving the host.
#[derive(Debug, Error)]
pub enum HostError {
  #[error("invalid host config: {0}")]
  Config(#[from] ConfigError),

  #[error("session storage error: {0}")]
  SessionIo(#[from] std::io::Error),

  #[error("invalid session data: {0}")]
  SessionParse(#[from] serde_json::Error),

  /// The auth strategy rejected the credentials.
  #[error("sign-in failed for '{user}': {message}")]
  SignIn { user: String, message: String },
}

impl HostError {
  pub fn sign_in(user: impl Into<String>, message: impl Into<String>) -> Self {
    Self::SignIn {
      user: user.into(),
      message: message.into(),
    }
  }
}
