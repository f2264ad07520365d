use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::action::Action;
use crate::handle::{Registration, RegistrationHandle};
use crate::reducer::{RootReducer, SharedReducer};

/// Capacity of the dispatched-action broadcast channel.
const ACTION_CHANNEL_CAPACITY: usize = 256;

struct ReducerTable {
  static_slices: BTreeMap<String, SharedReducer>,
  dynamic_slices: BTreeMap<String, SharedReducer>,
  root: Arc<RootReducer>,
}

impl ReducerTable {
  fn contains(&self, name: &str) -> bool {
    self.static_slices.contains_key(name) || self.dynamic_slices.contains_key(name)
  }

  fn rebuild_root(&mut self) {
    let slices = self
      .static_slices
      .iter()
      .chain(self.dynamic_slices.iter())
      .map(|(name, reducer)| (name.clone(), reducer.clone()))
      .collect();
    self.root = Arc::new(RootReducer::new(slices));
  }
}

/// The shared state store.
///
/// Created once per host. Dispatches and registrations may come from any task;
/// the reducer table lock orders registrations against dispatches so a slice
/// added mid-flight is never half visible.
pub struct Store {
  reducers: RwLock<ReducerTable>,
  state: watch::Sender<Value>,
  actions: broadcast::Sender<Action>,
}

impl Store {
  pub fn builder() -> StoreBuilder {
    StoreBuilder::default()
  }

  /// Create a store with no static slices.
  pub fn new() -> Arc<Self> {
    Self::builder().build()
  }

  /// Add `reducer` under `name` if no slice of that name exists.
  ///
  /// A duplicate name is a silent no-op: the existing reducer and its
  /// accumulated state are kept. The returned handle is scoped to `name` in
  /// both cases.
  pub fn register_slice(
    self: &Arc<Self>,
    name: impl Into<String>,
    reducer: SharedReducer,
  ) -> RegistrationHandle {
    let name = name.into();
    let outcome = self.add_if_absent(&name, reducer);

    match outcome {
      Registration::Registered => info!(slice = %name, "slice_registered"),
      Registration::AlreadyRegistered => debug!(slice = %name, "slice_registration_skipped"),
    }

    RegistrationHandle::new(self.clone(), name, outcome)
  }

  fn add_if_absent(&self, name: &str, reducer: SharedReducer) -> Registration {
    let mut table = self.reducers.write().unwrap_or_else(|e| e.into_inner());
    if table.contains(name) {
      return Registration::AlreadyRegistered;
    }

    let initial = reducer.initial_state();
    table.dynamic_slices.insert(name.to_string(), reducer);
    table.rebuild_root();

    // Additive swap: only the new key is touched.
    self.state.send_modify(|state| {
      if let Value::Object(map) = state {
        map.entry(name.to_string()).or_insert(initial);
      }
    });

    Registration::Registered
  }

  /// Run `action` through the root reducer and publish the new state.
  pub fn dispatch(&self, action: Action) {
    {
      let table = self.reducers.read().unwrap_or_else(|e| e.into_inner());
      let root = table.root.clone();
      self.state.send_modify(|state| {
        *state = root.reduce(state, &action);
      });
    }

    debug!(action = %action.kind, "action_dispatched");
    // No receivers is fine; nobody is listening for actions yet.
    let _ = self.actions.send(action);
  }

  /// Snapshot of the whole state tree.
  pub fn state(&self) -> Value {
    self.state.borrow().clone()
  }

  /// Snapshot of one slice, or `Null` if it is not registered.
  pub fn slice_state(&self, name: &str) -> Value {
    self
      .state
      .borrow()
      .get(name)
      .cloned()
      .unwrap_or(Value::Null)
  }

  /// Watch the root state. The receiver always sees the latest tree.
  pub fn subscribe(&self) -> watch::Receiver<Value> {
    self.state.subscribe()
  }

  /// Receive every action dispatched after this call.
  pub fn actions(&self) -> broadcast::Receiver<Action> {
    self.actions.subscribe()
  }

  pub fn contains_slice(&self, name: &str) -> bool {
    self
      .reducers
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .contains(name)
  }

  /// Names of every registered slice, static first.
  pub fn slice_names(&self) -> Vec<String> {
    let table = self.reducers.read().unwrap_or_else(|e| e.into_inner());
    table
      .static_slices
      .keys()
      .chain(table.dynamic_slices.keys())
      .cloned()
      .collect()
  }

  /// Names of slices contributed at run time.
  pub fn dynamic_slice_names(&self) -> Vec<String> {
    let table = self.reducers.read().unwrap_or_else(|e| e.into_inner());
    table.dynamic_slices.keys().cloned().collect()
  }
}

/// Builds a [`Store`] with the host's static slices.
#[derive(Default)]
pub struct StoreBuilder {
  slices: BTreeMap<String, SharedReducer>,
}

impl StoreBuilder {
  /// Add a static slice. The first reducer given for a name wins.
  pub fn slice(mut self, name: impl Into<String>, reducer: SharedReducer) -> Self {
    self.slices.entry(name.into()).or_insert(reducer);
    self
  }

  pub fn build(self) -> Arc<Store> {
    let state: serde_json::Map<String, Value> = self
      .slices
      .iter()
      .map(|(name, reducer)| (name.clone(), reducer.initial_state()))
      .collect();

    let mut table = ReducerTable {
      static_slices: self.slices,
      dynamic_slices: BTreeMap::new(),
      root: Arc::new(RootReducer::new(Vec::new())),
    };
    table.rebuild_root();

    let (state, _) = watch::channel(Value::Object(state));
    let (actions, _) = broadcast::channel(ACTION_CHANNEL_CAPACITY);

    Arc::new(Store {
      reducers: RwLock::new(table),
      state,
      actions,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reducer::reducer_fn;
  use serde_json::json;

  fn counter(start: i64) -> SharedReducer {
    Arc::new(reducer_fn(json!({ "count": start }), |state, action| {
      if action.is("counter/increment") {
        let count = state["count"].as_i64().unwrap_or(0);
        json!({ "count": count + 1 })
      } else {
        state.clone()
      }
    }))
  }

  #[test]
  fn test_builder_seeds_static_state() {
    let store = Store::builder().slice("router", counter(3)).build();
    assert_eq!(store.state(), json!({ "router": { "count": 3 } }));
    assert!(store.contains_slice("router"));
    assert!(store.dynamic_slice_names().is_empty());
  }

  #[test]
  fn test_register_adds_slice_and_keeps_others() {
    let store = Store::builder().slice("router", counter(0)).build();
    store.dispatch(Action::new("counter/increment"));

    let handle = store.register_slice("users", counter(10));
    assert_eq!(handle.outcome(), Registration::Registered);
    assert_eq!(
      store.state(),
      json!({ "router": { "count": 1 }, "users": { "count": 10 } })
    );
  }

  #[test]
  fn test_duplicate_registration_keeps_first_reducer_and_state() {
    let store = Store::new();
    let first = store.register_slice("authorize", counter(0));
    first.dispatch(Action::new("counter/increment"));
    first.dispatch(Action::new("counter/increment"));

    let second = store.register_slice("authorize", counter(100));
    assert_eq!(second.outcome(), Registration::AlreadyRegistered);
    assert_eq!(second.select_micro_app_state(), json!({ "count": 2 }));

    second.dispatch(Action::new("counter/increment"));
    assert_eq!(first.select_micro_app_state(), json!({ "count": 3 }));
    assert_eq!(store.dynamic_slice_names(), vec!["authorize".to_string()]);
  }

  #[test]
  fn test_register_static_name_is_skipped() {
    let store = Store::builder().slice("session", counter(0)).build();
    let handle = store.register_slice("session", counter(7));
    assert_eq!(handle.outcome(), Registration::AlreadyRegistered);
    assert_eq!(store.slice_state("session"), json!({ "count": 0 }));
  }

  #[test]
  fn test_slice_state_of_unknown_is_null() {
    let store = Store::new();
    assert_eq!(store.slice_state("missing"), Value::Null);
  }

  #[test]
  fn test_concurrent_registration_single_winner() {
    let store = Store::new();
    let handles: Vec<_> = (0..8)
      .map(|i| {
        let store = store.clone();
        std::thread::spawn(move || store.register_slice("roles", counter(i)).outcome())
      })
      .collect();

    let outcomes: Vec<Registration> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = outcomes
      .iter()
      .filter(|o| **o == Registration::Registered)
      .count();
    assert_eq!(winners, 1);
    assert_eq!(store.slice_names(), vec!["roles".to_string()]);
  }

  #[tokio::test]
  async fn test_subscribe_sees_dispatch() {
    let store = Store::new();
    let handle = store.register_slice("groups", counter(0));
    let mut rx = store.subscribe();
    rx.borrow_and_update();

    handle.dispatch(Action::new("counter/increment"));
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow()["groups"]["count"], 1);
  }

  #[tokio::test]
  async fn test_actions_are_broadcast() {
    let store = Store::new();
    let mut actions = store.actions();
    store.dispatch(Action::with_payload("router/push", json!("/roles")));

    let received = actions.recv().await.unwrap();
    assert!(received.is("router/push"));
    assert_eq!(received.payload, json!("/roles"));
  }
}
