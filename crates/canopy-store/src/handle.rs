use std::sync::Arc;

use serde_json::Value;

use crate::action::Action;
use crate::store::Store;

/// What a call to `register_slice` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
  /// The slice was new and has been added.
  Registered,
  /// A slice of that name already existed; nothing changed.
  AlreadyRegistered,
}

/// Dispatches actions into the whole store.
#[derive(Clone)]
pub struct Dispatcher {
  store: Arc<Store>,
}

impl Dispatcher {
  pub fn new(store: Arc<Store>) -> Self {
    Self { store }
  }

  pub fn dispatch(&self, action: Action) {
    self.store.dispatch(action);
  }
}

/// Returned by [`Store::register_slice`], scoped to one slice.
#[derive(Clone)]
pub struct RegistrationHandle {
  store: Arc<Store>,
  slice: String,
  outcome: Registration,
}

impl RegistrationHandle {
  pub(crate) fn new(store: Arc<Store>, slice: String, outcome: Registration) -> Self {
    Self {
      store,
      slice,
      outcome,
    }
  }

  /// Bound dispatcher for the whole store.
  pub fn dispatcher(&self) -> Dispatcher {
    Dispatcher::new(self.store.clone())
  }

  pub fn dispatch(&self, action: Action) {
    self.store.dispatch(action);
  }

  /// Current state of the caller's own slice.
  pub fn select_micro_app_state(&self) -> Value {
    self.store.slice_state(&self.slice)
  }

  /// Current state of the full tree.
  pub fn select_root_state(&self) -> Value {
    self.store.state()
  }

  pub fn slice_name(&self) -> &str {
    &self.slice
  }

  pub fn outcome(&self) -> Registration {
    self.outcome
  }
}

impl std::fmt::Debug for RegistrationHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RegistrationHandle")
      .field("slice", &self.slice)
      .field("outcome", &self.outcome)
      .finish()
  }
}
