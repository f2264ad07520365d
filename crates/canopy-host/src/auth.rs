use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::session::Session;

/// What a user presents to sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
  pub user: String,
  pub token: String,
}

impl Credentials {
  pub fn new(user: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      user: user.into(),
      token: token.into(),
    }
  }
}

/// How the host authenticates users and authorizes outgoing requests.
///
/// The host wires exactly one strategy into its request layer.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
  /// Exchange credentials for a session.
  async fn sign_in(&self, credentials: &Credentials) -> Result<Session, HostError>;

  /// Value of the `Authorization` header carrying `access_token`.
  fn authorization(&self, access_token: &str) -> String;
}

/// Bearer-token authentication: the presented token is the access token.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth;

#[async_trait]
impl AuthStrategy for BearerAuth {
  async fn sign_in(&self, credentials: &Credentials) -> Result<Session, HostError> {
    if credentials.user.trim().is_empty() {
      return Err(HostError::sign_in(&credentials.user, "user must not be empty"));
    }
    if credentials.token.trim().is_empty() {
      return Err(HostError::sign_in(&credentials.user, "token must not be empty"));
    }
    Ok(Session::new(&credentials.user, &credentials.token))
  }

  fn authorization(&self, access_token: &str) -> String {
    format!("Bearer {}", access_token)
  }
}
