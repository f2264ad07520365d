use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use canopy_module::MicroAppModule;

/// Modules compiled into the host, keyed by manifest entry name.
#[derive(Default, Clone)]
pub struct ModuleCatalog {
  modules: HashMap<String, Arc<dyn MicroAppModule>>,
}

impl ModuleCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a module under `entry`, replacing any previous one.
  pub fn register(&mut self, entry: impl Into<String>, module: Arc<dyn MicroAppModule>) {
    self.modules.insert(entry.into(), module);
  }

  pub fn with(mut self, entry: impl Into<String>, module: Arc<dyn MicroAppModule>) -> Self {
    self.register(entry, module);
    self
  }

  pub fn resolve(&self, entry: &str) -> Option<Arc<dyn MicroAppModule>> {
    self.modules.get(entry).cloned()
  }

  pub fn entries(&self) -> Vec<&str> {
    let mut entries: Vec<&str> = self.modules.keys().map(String::as_str).collect();
    entries.sort_unstable();
    entries
  }
}

impl fmt::Debug for ModuleCatalog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ModuleCatalog")
      .field("entries", &self.entries())
      .finish()
  }
}
