use std::fmt;
use std::sync::Arc;

use crate::HostRouter;

/// Navigation handle given to micro-apps.
///
/// Relative targets (no leading `/`) resolve against the mount's base path, so a
/// micro-app mounted at `/authorize` can navigate to `roles/42` without knowing
/// where the host placed it.
#[derive(Clone)]
pub struct Navigator {
  router: Arc<dyn HostRouter>,
  base_path: String,
}

impl Navigator {
  pub fn new(router: Arc<dyn HostRouter>, base_path: impl Into<String>) -> Self {
    Self {
      router,
      base_path: base_path.into(),
    }
  }

  pub fn base_path(&self) -> &str {
    &self.base_path
  }

  pub fn push(&self, to: &str) {
    self.router.push(&join_paths(&self.base_path, to));
  }

  pub fn replace(&self, to: &str) {
    self.router.replace(&join_paths(&self.base_path, to));
  }

  pub fn back(&self) -> bool {
    self.router.back()
  }

  pub fn forward(&self) -> bool {
    self.router.forward()
  }
}

impl fmt::Debug for Navigator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Navigator")
      .field("base_path", &self.base_path)
      .finish_non_exhaustive()
  }
}

/// Resolve `to` against `base`. Absolute targets are returned unchanged.
pub fn join_paths(base: &str, to: &str) -> String {
  if to.starts_with('/') {
    return to.to_string();
  }
  let base = base.trim_end_matches('/');
  if to.is_empty() {
    return if base.is_empty() {
      "/".to_string()
    } else {
      base.to_string()
    };
  }
  format!("{}/{}", base, to)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::MemoryRouter;

  #[test]
  fn test_join_paths() {
    assert_eq!(join_paths("/authorize", "roles"), "/authorize/roles");
    assert_eq!(join_paths("/authorize/", "roles"), "/authorize/roles");
    assert_eq!(join_paths("/authorize", "/users"), "/users");
    assert_eq!(join_paths("/", "users"), "/users");
    assert_eq!(join_paths("/", ""), "/");
    assert_eq!(join_paths("/authorize", ""), "/authorize");
  }

  #[test]
  fn test_navigator_resolves_relative() {
    let router = Arc::new(MemoryRouter::new("/authorize"));
    let navigator = Navigator::new(router.clone(), "/authorize");
    navigator.push("roles?sort=name");
    assert_eq!(router.location().to_string(), "/authorize/roles?sort=name");
    assert!(navigator.back());
    assert_eq!(router.location().pathname, "/authorize");
  }
}
