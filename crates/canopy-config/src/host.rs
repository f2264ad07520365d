use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::api::ApiConfig;
use crate::descriptor::MicroAppDescriptor;
use crate::error::ConfigError;

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
  #[serde(default)]
  pub api: ApiConfig,

  /// Micro-apps the host may mount.
  #[serde(default)]
  pub micro_apps: Vec<MicroAppDescriptor>,

  /// Where the session is persisted. Relative paths are resolved against the
  /// data directory by the caller.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub session_path: Option<PathBuf>,

  /// Location the host router starts at.
  #[serde(default = "default_initial_path")]
  pub initial_path: String,
}

fn default_initial_path() -> String {
  "/".to_string()
}

impl HostConfig {
  /// Parse and validate a JSON configuration document.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let config: HostConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Check slugs and html tags are unique and descriptors are complete.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    let mut tags = HashSet::new();
    for app in &self.micro_apps {
      if app.slug.trim().is_empty() {
        return Err(ConfigError::InvalidDescriptor {
          slug: app.slug.clone(),
          message: "slug must not be empty".to_string(),
        });
      }
      if !app.html_tag.contains('-') {
        return Err(ConfigError::InvalidDescriptor {
          slug: app.slug.clone(),
          message: format!("html tag '{}' must contain a hyphen", app.html_tag),
        });
      }
      if !seen.insert(app.slug.as_str()) {
        return Err(ConfigError::DuplicateSlug {
          slug: app.slug.clone(),
        });
      }
      if !tags.insert(app.html_tag.as_str()) {
        return Err(ConfigError::InvalidDescriptor {
          slug: app.slug.clone(),
          message: format!("html tag '{}' is already used by another micro-app", app.html_tag),
        });
      }
    }
    Ok(())
  }

  pub fn micro_app(&self, slug: &str) -> Option<&MicroAppDescriptor> {
    self.micro_apps.iter().find(|app| app.slug == slug)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_from_json_defaults() {
    let config = HostConfig::from_json("{}").unwrap();
    assert_eq!(config.initial_path, "/");
    assert_eq!(config.api, ApiConfig::default());
    assert!(config.micro_apps.is_empty());
  }

  #[test]
  fn test_from_json_full() {
    let config = HostConfig::from_json(
      r#"{
        "api": { "base_url": "https://api.example.com" },
        "initial_path": "/roles",
        "micro_apps": [
          { "slug": "authorize", "bundle": "bundles/authorize", "html_tag": "authorize-app",
            "config": { "theme": "dark" } }
        ]
      }"#,
    )
    .unwrap();

    assert_eq!(config.api.base_url, "https://api.example.com");
    assert_eq!(config.initial_path, "/roles");
    let app = config.micro_app("authorize").unwrap();
    assert_eq!(app.config["theme"], "dark");
  }

  #[test]
  fn test_duplicate_slug_rejected() {
    let result = HostConfig::from_json(
      r#"{ "micro_apps": [
        { "slug": "users", "bundle": "a", "html_tag": "users-app" },
        { "slug": "users", "bundle": "b", "html_tag": "users-app" }
      ] }"#,
    );
    assert!(matches!(result, Err(ConfigError::DuplicateSlug { slug }) if slug == "users"));
  }

  #[test]
  fn test_tag_without_hyphen_rejected() {
    let result = HostConfig::from_json(
      r#"{ "micro_apps": [ { "slug": "users", "bundle": "a", "html_tag": "users" } ] }"#,
    );
    assert!(matches!(result, Err(ConfigError::InvalidDescriptor { .. })));
  }

  #[test]
  fn test_shared_html_tag_rejected() {
    let result = HostConfig::from_json(
      r#"{ "micro_apps": [
        { "slug": "users", "bundle": "a", "html_tag": "demo-app" },
        { "slug": "roles", "bundle": "b", "html_tag": "demo-app" }
      ] }"#,
    );
    assert!(matches!(result, Err(ConfigError::InvalidDescriptor { slug, .. }) if slug == "roles"));
  }
}
