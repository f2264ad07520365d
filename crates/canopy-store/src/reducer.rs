use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::action::Action;

/// Owns one slice of the state tree.
///
/// Reducers must be pure: they compute the next state from the current one and
/// must not dispatch from inside `reduce`.
pub trait Reducer: Send + Sync {
  /// State the slice starts with when it is first added to the store.
  fn initial_state(&self) -> Value;

  /// Compute the next slice state. Return `state.clone()` for unhandled actions.
  fn reduce(&self, state: &Value, action: &Action) -> Value;
}

pub type SharedReducer = Arc<dyn Reducer>;

/// A reducer built from an initial value and a closure.
pub struct FnReducer<F> {
  initial: Value,
  reduce: F,
}

/// Build a reducer from an initial state and a reduce closure.
pub fn reducer_fn<F>(initial: Value, reduce: F) -> FnReducer<F>
where
  F: Fn(&Value, &Action) -> Value + Send + Sync,
{
  FnReducer { initial, reduce }
}

impl<F> Reducer for FnReducer<F>
where
  F: Fn(&Value, &Action) -> Value + Send + Sync,
{
  fn initial_state(&self) -> Value {
    self.initial.clone()
  }

  fn reduce(&self, state: &Value, action: &Action) -> Value {
    (self.reduce)(state, action)
  }
}

/// Composite reducer over every registered slice.
///
/// Rebuilt whenever a slice is added; never mutated in place.
pub(crate) struct RootReducer {
  slices: Vec<(String, SharedReducer)>,
}

impl RootReducer {
  pub(crate) fn new(slices: Vec<(String, SharedReducer)>) -> Self {
    Self { slices }
  }

  /// Run `action` through every slice reducer.
  ///
  /// Slices missing from `state` start from their initial state. Keys that no
  /// reducer owns are carried over untouched.
  pub(crate) fn reduce(&self, state: &Value, action: &Action) -> Value {
    let mut next = match state {
      Value::Object(map) => map.clone(),
      _ => serde_json::Map::new(),
    };

    for (name, reducer) in &self.slices {
      let current = match next.get(name) {
        Some(current) => current.clone(),
        None => reducer.initial_state(),
      };
      // A panicking slice keeps its previous state; the other slices still run.
      let slice_state = match catch_unwind(AssertUnwindSafe(|| reducer.reduce(&current, action))) {
        Ok(slice_state) => slice_state,
        Err(_) => {
          warn!(slice = %name, action = %action.kind, "slice_reducer_panicked");
          current
        }
      };
      next.insert(name.clone(), slice_state);
    }

    Value::Object(next)
  }
}
