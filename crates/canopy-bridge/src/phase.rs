use canopy_module::DomType;
use serde::Serialize;

use crate::error::{SlotError, SlotErrorKind};

/// Where a slot is in its mount lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotPhase {
  Idle,
  Fetching,
  Initializing,
  Mounted { dom_type: DomType },
  Failed(SlotError),
}

impl SlotPhase {
  /// Mounted or failed: nothing more happens without a remount.
  pub fn is_settled(&self) -> bool {
    matches!(self, Self::Mounted { .. } | Self::Failed(_))
  }

  pub fn is_mounted(&self) -> bool {
    matches!(self, Self::Mounted { .. })
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::Fetching => "fetching",
      Self::Initializing => "initializing",
      Self::Mounted { .. } => "mounted",
      Self::Failed(_) => "failed",
    }
  }
}

/// Inline failure panel shown in place of a micro-app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
  pub slug: String,
  pub kind: SlotErrorKind,
  pub message: String,
  pub detail: Option<String>,
}

impl ErrorPanel {
  /// Text for the panel. Detail is only included when asked for.
  pub fn render(&self, show_detail: bool) -> String {
    let mut text = format!("Micro-app '{}' failed to load: {}", self.slug, self.message);
    if show_detail && let Some(detail) = &self.detail {
      text.push('\n');
      text.push_str(detail);
    }
    text
  }
}

impl From<&SlotError> for ErrorPanel {
  fn from(error: &SlotError) -> Self {
    Self {
      slug: error.slug.clone(),
      kind: error.kind,
      message: error.message.clone(),
      detail: error.detail.clone(),
    }
  }
}

/// What a slot contributes to the host's UI tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotView {
  /// Not requested yet.
  Idle,
  /// Fetching or initializing.
  Loading { slug: String },
  /// Rendered inside the host tree; `content` is the element's output.
  Shared { tag: String, content: String },
  /// Opaque custom element boundary; the host sees only the tag.
  Isolated { tag: String },
  Error(ErrorPanel),
}
