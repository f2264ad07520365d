use std::fmt;
use std::sync::Arc;

use canopy_config::MicroAppDescriptor;
use canopy_loader::{BundleManifest, RawModule};
use canopy_module::{
  HostContext, InitError, InitOutcome, MicroAppElement, MicroAppModule, ReducerRegistrar,
};
use canopy_store::Store;
use serde_json::Value;

/// A successfully loaded micro-app, cached by slug.
pub struct LoadedPackage {
  /// Copy of the descriptor the package was loaded from.
  pub metadata: MicroAppDescriptor,

  /// Manifest the bundle location resolved to.
  pub manifest: BundleManifest,

  /// Manifest config overlaid with descriptor config.
  pub config: Value,

  module: Arc<dyn MicroAppModule>,
  registrar: ReducerRegistrar,
}

impl LoadedPackage {
  pub(crate) fn new(metadata: MicroAppDescriptor, raw: RawModule, store: Arc<Store>) -> Self {
    let config = merge_config(&raw.manifest.config, &metadata.config);
    let registrar = ReducerRegistrar::new(store, metadata.slug.clone());
    Self {
      metadata,
      manifest: raw.manifest,
      config,
      module: raw.module,
      registrar,
    }
  }

  pub fn slug(&self) -> &str {
    &self.metadata.slug
  }

  pub fn html_tag(&self) -> &str {
    &self.metadata.html_tag
  }

  /// Hooks handed to the micro-app at init time.
  pub fn host_context(&self) -> HostContext {
    HostContext {
      html_tag: self.metadata.html_tag.clone(),
      config: self.config.clone(),
      register_reducer: self.registrar.clone(),
    }
  }

  /// Run the micro-app's one-shot initialization.
  ///
  /// The manager never calls this. The mount bridge calls it once per slot.
  pub async fn init(&self) -> Result<InitOutcome, InitError> {
    self.module.init(self.host_context()).await
  }

  /// Create the micro-app's root element.
  pub fn create_element(&self) -> Arc<dyn MicroAppElement> {
    self.module.create_element(&self.metadata.html_tag)
  }
}

impl fmt::Debug for LoadedPackage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoadedPackage")
      .field("slug", &self.metadata.slug)
      .field("version", &self.manifest.version)
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

/// Overlay `overrides` on `defaults`.
///
/// Objects merge key by key with `overrides` winning; a null override keeps
/// the defaults; any other override replaces them.
pub fn merge_config(defaults: &Value, overrides: &Value) -> Value {
  match (defaults, overrides) {
    (_, Value::Null) => defaults.clone(),
    (Value::Object(base), Value::Object(top)) => {
      let mut merged = base.clone();
      for (key, value) in top {
        merged.insert(key.clone(), value.clone());
      }
      Value::Object(merged)
    }
    _ => overrides.clone(),
  }
}
