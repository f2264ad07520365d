use std::fmt;

use canopy_manager::ManagerError;
use canopy_module::InitError;
use serde::Serialize;
use thiserror::Error;

/// Which step of the mount lifecycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotErrorKind {
  /// Fetching the bundle failed. The package is not cached.
  Load,
  /// The micro-app's own `init` failed. The package stays cached.
  Init,
  /// Creating or updating the mounted element failed.
  Render,
}

impl fmt::Display for SlotErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Load => f.write_str("load"),
      Self::Init => f.write_str("init"),
      Self::Render => f.write_str("render"),
    }
  }
}

/// A failure scoped to one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind} error in micro-app '{slug}': {message}")]
pub struct SlotError {
  pub kind: SlotErrorKind,
  pub slug: String,
  pub message: String,
  /// Raw diagnostic detail, shown on demand.
  pub detail: Option<String>,
}

impl SlotError {
  pub fn load(slug: &str, error: &ManagerError) -> Self {
    Self {
      kind: SlotErrorKind::Load,
      slug: slug.to_string(),
      message: error.to_string(),
      detail: Some(format!("{:?}", error)),
    }
  }

  pub fn init(slug: &str, error: &InitError) -> Self {
    Self {
      kind: SlotErrorKind::Init,
      slug: slug.to_string(),
      message: error.to_string(),
      detail: Some(
        error
          .detail()
          .map(str::to_string)
          .unwrap_or_else(|| format!("{:?}", error)),
      ),
    }
  }

  /// Build an error from a caught panic payload.
  pub fn panicked(kind: SlotErrorKind, slug: &str, payload: &(dyn std::any::Any + Send)) -> Self {
    let detail = payload
      .downcast_ref::<&str>()
      .map(|s| s.to_string())
      .or_else(|| payload.downcast_ref::<String>().cloned());
    Self {
      kind,
      slug: slug.to_string(),
      message: format!("micro-app panicked during {}", kind),
      detail,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_init_error_keeps_detail() {
    let error = SlotError::init("users", &InitError::with_detail("no backend", "GET /users -> 503"));
    assert_eq!(error.kind, SlotErrorKind::Init);
    assert_eq!(error.message, "no backend");
    assert_eq!(error.detail.as_deref(), Some("GET /users -> 503"));
    assert_eq!(error.to_string(), "init error in micro-app 'users': no backend");
  }

  #[test]
  fn test_load_error_message() {
    let error = SlotError::load(
      "ghost",
      &ManagerError::UnknownMicroApp {
        slug: "ghost".to_string(),
      },
    );
    assert_eq!(error.kind, SlotErrorKind::Load);
    assert_eq!(error.message, "unknown micro-app: ghost");
    assert!(error.detail.unwrap().contains("UnknownMicroApp"));
  }

  #[test]
  fn test_panicked_string_payload() {
    let payload: Box<dyn std::any::Any + Send> = Box::new("boom".to_string());
    let error = SlotError::panicked(SlotErrorKind::Render, "roles", payload.as_ref());
    assert_eq!(error.detail.as_deref(), Some("boom"));
    assert_eq!(error.message, "micro-app panicked during render");
  }
}
