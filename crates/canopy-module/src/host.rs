use std::fmt;
use std::sync::Arc;

use canopy_store::{RegistrationHandle, SharedReducer, Store};

/// Registers reducers into the shared store under a fixed slice name.
///
/// Handed to a micro-app at init time already bound to its slug; the micro-app
/// cannot pick a different slice.
#[derive(Clone)]
pub struct ReducerRegistrar {
  store: Arc<Store>,
  slug: String,
}

impl ReducerRegistrar {
  pub fn new(store: Arc<Store>, slug: impl Into<String>) -> Self {
    Self {
      store,
      slug: slug.into(),
    }
  }

  pub fn slug(&self) -> &str {
    &self.slug
  }

  /// Register `reducer` as this micro-app's slice. Idempotent per slug.
  pub fn register(&self, reducer: SharedReducer) -> RegistrationHandle {
    self.store.register_slice(self.slug.clone(), reducer)
  }
}

impl fmt::Debug for ReducerRegistrar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReducerRegistrar")
      .field("slug", &self.slug)
      .finish_non_exhaustive()
  }
}

/// Everything a micro-app receives at init time.
#[derive(Debug, Clone)]
pub struct HostContext {
  /// Custom element name the micro-app must render as.
  pub html_tag: String,

  /// The micro-app's own configuration.
  pub config: serde_json::Value,

  /// Registers the micro-app's reducer under its slug.
  pub register_reducer: ReducerRegistrar,
}
