//! Static slices the host owns, and the action types that drive them.

use std::sync::Arc;

use canopy_store::{Action, SharedReducer, reducer_fn};
use serde_json::{Value, json};

pub const ROUTER_SLICE: &str = "router";
pub const SESSION_SLICE: &str = "session";

/// Dispatched by the host whenever the router location changes.
pub const LOCATION_CHANGED: &str = "router/locationChanged";
/// Dispatch with payload `{ "to": "/path" }` to navigate.
pub const NAVIGATE_PUSH: &str = "router/push";
pub const NAVIGATE_REPLACE: &str = "router/replace";
pub const NAVIGATE_BACK: &str = "router/back";
pub const NAVIGATE_FORWARD: &str = "router/forward";

pub const SESSION_RESTORED: &str = "session/restored";
pub const SESSION_SIGNED_IN: &str = "session/signedIn";
pub const SESSION_SIGNED_OUT: &str = "session/signedOut";

/// Mirrors the router location: `{ pathname, search, hash }`.
pub fn router_reducer() -> SharedReducer {
  Arc::new(reducer_fn(
    json!({ "pathname": "/", "search": "", "hash": "" }),
    |state, action| {
      if action.is(LOCATION_CHANGED) && action.payload.is_object() {
        action.payload.clone()
      } else {
        state.clone()
      }
    },
  ))
}

/// Who is signed in: `{ authenticated, user }`.
pub fn session_reducer() -> SharedReducer {
  Arc::new(reducer_fn(signed_out(), |state, action| {
    if action.is(SESSION_RESTORED) || action.is(SESSION_SIGNED_IN) {
      json!({ "authenticated": true, "user": action.payload["user"].clone() })
    } else if action.is(SESSION_SIGNED_OUT) {
      signed_out()
    } else {
      state.clone()
    }
  }))
}

fn signed_out() -> Value {
  json!({ "authenticated": false, "user": null })
}

/// Build a `router/push` action.
pub fn push(to: &str) -> Action {
  Action::with_payload(NAVIGATE_PUSH, json!({ "to": to }))
}

/// Build a `router/replace` action.
pub fn replace(to: &str) -> Action {
  Action::with_payload(NAVIGATE_REPLACE, json!({ "to": to }))
}
