use serde::{Deserialize, Serialize};

/// Manifest published alongside a micro-app bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
  /// Bundle name, usually the slug.
  pub name: String,

  /// Semantic version, e.g. "1.2.0".
  pub version: String,

  /// Name of the module in the host catalog that implements this bundle.
  pub entry: String,

  /// Defaults for the micro-app's configuration. Descriptor config wins.
  #[serde(default)]
  pub config: serde_json::Value,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_manifest_config_defaults_to_null() {
    let manifest: BundleManifest =
      serde_json::from_str(r#"{ "name": "users", "version": "1.0.0", "entry": "users" }"#).unwrap();
    assert_eq!(manifest.config, serde_json::Value::Null);
  }

  #[test]
  fn test_manifest_missing_entry_rejected() {
    let result =
      serde_json::from_str::<BundleManifest>(r#"{ "name": "users", "version": "1.0.0" }"#);
    assert!(result.is_err());
  }
}
