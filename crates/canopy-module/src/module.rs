use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::MountContext;
use crate::error::InitError;
use crate::host::HostContext;

/// How a micro-app wants to be mounted. Reported by the micro-app, never
/// chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomType {
  /// Rendered inside the host's own component tree.
  Shared,
  /// Rendered behind its own custom element boundary, opaque to the host.
  Isolated,
}

/// Result of a successful `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitOutcome {
  pub dom_type: DomType,
}

impl InitOutcome {
  pub fn shared() -> Self {
    Self {
      dom_type: DomType::Shared,
    }
  }

  pub fn isolated() -> Self {
    Self {
      dom_type: DomType::Isolated,
    }
  }
}

/// The root element of a mounted micro-app.
pub trait MicroAppElement: Send + Sync {
  /// Receive a fresh context. Called on every host navigation or API change.
  fn update(&self, context: &MountContext);

  /// Rendered content. Only read by the host for shared mounts.
  fn render(&self) -> String;

  /// The slot holding this element has been removed.
  fn unmount(&self) {}
}

/// A loaded micro-app module.
#[async_trait]
pub trait MicroAppModule: Send + Sync {
  /// One-shot initialization. The caller guarantees a single call per mount.
  async fn init(&self, host: HostContext) -> Result<InitOutcome, InitError>;

  /// Create the element registered under `html_tag`.
  fn create_element(&self, html_tag: &str) -> Arc<dyn MicroAppElement>;
}
