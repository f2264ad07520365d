use std::fmt;
use std::sync::{Arc, RwLock};

use canopy_module::{AccessTokenSource, ApiContext};
use tokio::sync::watch;
use tracing::info;

use crate::auth::AuthStrategy;
use crate::session::Session;

/// Token accessor backed by the current session.
#[derive(Clone, Default)]
pub struct SessionTokens {
  session: Arc<RwLock<Option<Session>>>,
}

impl SessionTokens {
  fn set(&self, session: Option<Session>) {
    *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
  }

  pub fn session(&self) -> Option<Session> {
    self
      .session
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .clone()
  }
}

impl AccessTokenSource for SessionTokens {
  fn access_token(&self) -> Option<String> {
    self
      .session
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .as_ref()
      .map(|s| s.access_token.clone())
  }
}

/// Base URL and credentials for every API call the host or a micro-app makes.
///
/// Changes are published as fresh [`ApiContext`] snapshots, which the bridge
/// pushes into mounted micro-apps.
pub struct RequestLayer {
  auth: Arc<dyn AuthStrategy>,
  tokens: SessionTokens,
  api: watch::Sender<ApiContext>,
}

impl RequestLayer {
  pub fn new(base_url: impl Into<String>, auth: Arc<dyn AuthStrategy>) -> Self {
    let tokens = SessionTokens::default();
    let (api, _) = watch::channel(ApiContext::new(base_url, Arc::new(tokens.clone())));
    Self { auth, tokens, api }
  }

  pub fn base_url(&self) -> String {
    self.api.borrow().default_base_url.clone()
  }

  pub fn set_base_url(&self, base_url: impl Into<String>) {
    let base_url = base_url.into();
    info!(base_url = %base_url, "api_base_url_changed");
    self.publish(base_url);
  }

  pub(crate) fn set_session(&self, session: Option<Session>) {
    self.tokens.set(session);
    self.publish(self.base_url());
  }

  pub fn session(&self) -> Option<Session> {
    self.tokens.session()
  }

  pub fn access_token(&self) -> Option<String> {
    self.tokens.access_token()
  }

  /// `Authorization` header value for the current session, if signed in.
  pub fn authorization_header(&self) -> Option<String> {
    self
      .access_token()
      .map(|token| self.auth.authorization(&token))
  }

  pub fn api_context(&self) -> ApiContext {
    self.api.borrow().clone()
  }

  /// Receiver of API context snapshots.
  pub fn subscribe(&self) -> watch::Receiver<ApiContext> {
    self.api.subscribe()
  }

  pub fn auth(&self) -> &Arc<dyn AuthStrategy> {
    &self.auth
  }

  fn publish(&self, base_url: String) {
    self
      .api
      .send_replace(ApiContext::new(base_url, Arc::new(self.tokens.clone())));
  }
}

impl fmt::Debug for RequestLayer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RequestLayer")
      .field("base_url", &self.base_url())
      .field("signed_in", &self.tokens.session().is_some())
      .finish()
  }
}
