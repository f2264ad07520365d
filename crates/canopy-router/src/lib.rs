//! Canopy Router
//!
//! The host router as seen by the micro-app runtime. The runtime never owns
//! route definitions: it only reads the current [`Location`], subscribes to
//! changes and asks the router to navigate.
//!
//! [`MemoryRouter`] is an in-process history stack that backs the CLI and tests.

mod location;
mod memory;
mod navigator;

pub use location::Location;
pub use memory::MemoryRouter;
pub use navigator::{Navigator, join_paths};

use tokio::sync::watch;

/// Navigation source the host hands to the runtime.
pub trait HostRouter: Send + Sync {
  /// Current location.
  fn location(&self) -> Location;

  /// Receiver that always holds the latest location.
  fn subscribe(&self) -> watch::Receiver<Location>;

  /// Push a new history entry.
  fn push(&self, to: &str);

  /// Replace the current history entry.
  fn replace(&self, to: &str);

  /// Step back in history. Returns false if already at the first entry.
  fn back(&self) -> bool;

  /// Step forward in history. Returns false if already at the last entry.
  fn forward(&self) -> bool;
}
