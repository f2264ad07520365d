use std::sync::Arc;

use canopy_router::{HostRouter, Location};
use canopy_store::{Action, Store};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::slices::{
  LOCATION_CHANGED, NAVIGATE_BACK, NAVIGATE_FORWARD, NAVIGATE_PUSH, NAVIGATE_REPLACE,
};

/// Keeps the router and the store in step.
///
/// Router changes are dispatched as `router/locationChanged`; dispatched
/// `router/push`, `router/replace`, `router/back` and `router/forward` actions
/// move the router.
pub struct LocationSync {
  store: Arc<Store>,
  router: Arc<dyn HostRouter>,
}

impl LocationSync {
  pub fn new(store: Arc<Store>, router: Arc<dyn HostRouter>) -> Self {
    Self { store, router }
  }

  /// Dispatch the current location and start syncing until `cancel` fires.
  pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
    // Subscribe before spawning so nothing dispatched after this call is missed.
    let mut locations = self.router.subscribe();
    let mut actions = self.store.actions();
    locations.mark_unchanged();
    self.store.dispatch(location_changed(&self.router.location()));

    tokio::spawn(async move {
      info!("location_sync_started");
      loop {
        tokio::select! {
          biased;
          _ = cancel.cancelled() => break,
          changed = locations.changed() => {
            if changed.is_err() {
              break;
            }
            let location = locations.borrow_and_update().clone();
            self.store.dispatch(location_changed(&location));
          }
          action = actions.recv() => match action {
            Ok(action) => {
              apply_navigation(self.router.as_ref(), &action);
            }
            Err(RecvError::Lagged(skipped)) => {
              warn!(skipped, "location_sync_lagged");
            }
            Err(RecvError::Closed) => break,
          },
        }
      }
      info!("location_sync_stopped");
    })
  }
}

fn location_changed(location: &Location) -> Action {
  Action::with_payload(
    LOCATION_CHANGED,
    json!({
      "pathname": location.pathname,
      "search": location.search,
      "hash": location.hash,
    }),
  )
}

/// Apply a navigation action to `router`. Returns false for anything that is
/// not a navigation action, or one missing its `to` path.
pub fn apply_navigation(router: &dyn HostRouter, action: &Action) -> bool {
  match action.kind.as_str() {
    NAVIGATE_PUSH | NAVIGATE_REPLACE => {
      let Some(to) = action.payload["to"].as_str() else {
        warn!(action = %action.kind, "navigation_missing_target");
        return false;
      };
      debug!(action = %action.kind, to = %to, "navigation_requested");
      if action.is(NAVIGATE_PUSH) {
        router.push(to);
      } else {
        router.replace(to);
      }
      true
    }
    NAVIGATE_BACK => router.back(),
    NAVIGATE_FORWARD => router.forward(),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::slices::push;
  use canopy_router::MemoryRouter;

  #[test]
  fn test_apply_navigation() {
    let router = MemoryRouter::new("/");
    assert!(apply_navigation(&router, &push("/users")));
    assert_eq!(router.location().pathname, "/users");

    assert!(apply_navigation(&router, &Action::new(NAVIGATE_BACK)));
    assert_eq!(router.location().pathname, "/");
    assert!(apply_navigation(&router, &Action::new(NAVIGATE_FORWARD)));
    assert_eq!(router.location().pathname, "/users");

    assert!(!apply_navigation(&router, &Action::new(NAVIGATE_PUSH)));
    assert!(!apply_navigation(&router, &Action::new("users/loaded")));
  }
}
