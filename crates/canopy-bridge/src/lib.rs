//! Canopy Bridge
//!
//! Drives a micro-app through its mount lifecycle inside one UI slot and keeps
//! it fed with routing and API context afterwards.
//!
//! # Slot phases
//!
//! ```text
//! Idle ──request()──> Fetching ──package──> Initializing ──dom type──> Mounted
//!                        │                        │                      │
//!                        └──────── error ─────────┴──> Failed            └─ context pushes
//! ```
//!
//! Each slot runs one task per attempt, so the phases of an attempt never
//! reorder and `init` runs once. While mounted the task watches the router
//! location and the API context and pushes the latest snapshot into the
//! element; a burst of changes collapses to the newest one. `unmount()` cancels
//! the task and freezes the slot: late fetch or init results are dropped.

mod bridge;
mod error;
mod instance;
mod phase;
mod slot;

pub use bridge::MountBridge;
pub use error::{SlotError, SlotErrorKind};
pub use phase::{ErrorPanel, SlotPhase, SlotView};
pub use slot::MountSlot;
