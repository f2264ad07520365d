use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

use crate::HostRouter;
use crate::location::Location;

struct History {
  entries: Vec<Location>,
  index: usize,
}

/// In-memory history stack.
pub struct MemoryRouter {
  history: Mutex<History>,
  current: watch::Sender<Location>,
}

impl MemoryRouter {
  pub fn new(initial: &str) -> Self {
    let location = Location::parse(initial);
    let (current, _) = watch::channel(location.clone());
    Self {
      history: Mutex::new(History {
        entries: vec![location],
        index: 0,
      }),
      current,
    }
  }

  /// Number of entries in the history stack.
  pub fn len(&self) -> usize {
    self.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().entries.is_empty()
  }

  /// The history entry the router currently points at.
  pub fn current_entry(&self) -> Location {
    let history = self.lock();
    history.entries[history.index].clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, History> {
    self.history.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn publish(&self, location: Location) {
    debug!(location = %location, "location_changed");
    self.current.send_replace(location);
  }
}

impl Default for MemoryRouter {
  fn default() -> Self {
    Self::new("/")
  }
}

impl HostRouter for MemoryRouter {
  fn location(&self) -> Location {
    self.current.borrow().clone()
  }

  fn subscribe(&self) -> watch::Receiver<Location> {
    self.current.subscribe()
  }

  // Each method publishes while holding the history lock, so the watched
  // location always matches the current history entry.

  fn push(&self, to: &str) {
    let location = Location::parse(to);
    let mut history = self.lock();
    let keep = history.index + 1;
    history.entries.truncate(keep);
    history.entries.push(location.clone());
    history.index = history.entries.len() - 1;
    self.publish(location);
  }

  fn replace(&self, to: &str) {
    let location = Location::parse(to);
    let mut history = self.lock();
    let index = history.index;
    history.entries[index] = location.clone();
    self.publish(location);
  }

  fn back(&self) -> bool {
    let mut history = self.lock();
    if history.index == 0 {
      return false;
    }
    history.index -= 1;
    self.publish(history.entries[history.index].clone());
    true
  }

  fn forward(&self) -> bool {
    let mut history = self.lock();
    if history.index + 1 >= history.entries.len() {
      return false;
    }
    history.index += 1;
    self.publish(history.entries[history.index].clone());
    true
  }
}
