use serde::{Deserialize, Serialize};

/// An action dispatched through the store.
///
/// Serialized as `{ "type": "...", "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
  #[serde(rename = "type")]
  pub kind: String,

  #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
  pub payload: serde_json::Value,
}

impl Action {
  pub fn new(kind: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      payload: serde_json::Value::Null,
    }
  }

  pub fn with_payload(kind: impl Into<String>, payload: serde_json::Value) -> Self {
    Self {
      kind: kind.into(),
      payload,
    }
  }

  /// Returns true if this action's type is `kind`.
  pub fn is(&self, kind: &str) -> bool {
    self.kind == kind
  }
}
