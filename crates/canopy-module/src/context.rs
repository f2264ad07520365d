use std::fmt;
use std::sync::Arc;

use canopy_router::{Location, Navigator};

/// Supplies the current access token, if any.
pub trait AccessTokenSource: Send + Sync {
  fn access_token(&self) -> Option<String>;
}

impl<F> AccessTokenSource for F
where
  F: Fn() -> Option<String> + Send + Sync,
{
  fn access_token(&self) -> Option<String> {
    self()
  }
}

/// API settings pushed into every mounted micro-app.
#[derive(Clone)]
pub struct ApiContext {
  pub default_base_url: String,
  tokens: Arc<dyn AccessTokenSource>,
}

impl ApiContext {
  pub fn new(default_base_url: impl Into<String>, tokens: Arc<dyn AccessTokenSource>) -> Self {
    Self {
      default_base_url: default_base_url.into(),
      tokens,
    }
  }

  /// An API context that never yields a token.
  pub fn anonymous(default_base_url: impl Into<String>) -> Self {
    Self::new(default_base_url, Arc::new(|| None::<String>))
  }

  /// Read the access token at call time.
  pub fn get_access_token(&self) -> Option<String> {
    self.tokens.access_token()
  }
}

impl PartialEq for ApiContext {
  fn eq(&self, other: &Self) -> bool {
    self.default_base_url == other.default_base_url && Arc::ptr_eq(&self.tokens, &other.tokens)
  }
}

impl fmt::Debug for ApiContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ApiContext")
      .field("default_base_url", &self.default_base_url)
      .finish_non_exhaustive()
  }
}

/// Routing information for a mounted micro-app.
#[derive(Debug, Clone)]
pub struct RoutingContext {
  pub base_path: String,
  pub location: Location,
  pub navigator: Navigator,
}

/// Immutable snapshot pushed into a mounted element.
///
/// `revision` grows by one with every push to the same element, so an element
/// can tell a fresh snapshot from a stale one.
#[derive(Debug, Clone)]
pub struct MountContext {
  pub revision: u64,

  /// Absent when the host is not inside a router context.
  pub routing: Option<RoutingContext>,

  pub api: ApiContext,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_api_context_reads_token_lazily() {
    let token = Arc::new(std::sync::Mutex::new(None::<String>));
    let source = token.clone();
    let api = ApiContext::new(
      "https://api.example.com",
      Arc::new(move || source.lock().unwrap().clone()),
    );

    assert_eq!(api.get_access_token(), None);
    *token.lock().unwrap() = Some("abc".to_string());
    assert_eq!(api.get_access_token().as_deref(), Some("abc"));
  }

  #[test]
  fn test_api_context_equality_is_by_source() {
    let a = ApiContext::anonymous("http://x");
    let b = a.clone();
    let c = ApiContext::anonymous("http://x");
    assert_eq!(a, b);
    assert_ne!(a, c);
  }
}
