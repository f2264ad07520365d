use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use canopy_config::{BundleLocation, MicroAppDescriptor};
use canopy_module::MicroAppModule;

use crate::catalog::ModuleCatalog;
use crate::error::LoadError;
use crate::fs_loader::FsBundleLoader;
use crate::http_loader::HttpBundleLoader;
use crate::manifest::BundleManifest;

/// A fetched bundle: its manifest and the module it resolved to.
#[derive(Clone)]
pub struct RawModule {
  pub manifest: BundleManifest,
  pub module: Arc<dyn MicroAppModule>,
}

impl RawModule {
  /// Resolve a manifest's entry against the catalog.
  pub fn resolve(
    slug: &str,
    manifest: BundleManifest,
    catalog: &ModuleCatalog,
  ) -> Result<Self, LoadError> {
    let module = catalog
      .resolve(&manifest.entry)
      .ok_or_else(|| LoadError::UnknownEntry {
        slug: slug.to_string(),
        entry: manifest.entry.clone(),
      })?;
    Ok(Self { manifest, module })
  }
}

impl fmt::Debug for RawModule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RawModule")
      .field("manifest", &self.manifest)
      .finish_non_exhaustive()
  }
}

/// Fetches a micro-app bundle. Opaque to the manager.
#[async_trait]
pub trait BundleLoader: Send + Sync {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError>;
}

#[async_trait]
impl<L: BundleLoader + ?Sized> BundleLoader for Arc<L> {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError> {
    (**self).load(descriptor).await
  }
}

/// Routes each descriptor to the filesystem or HTTP loader.
pub struct StandardBundleLoader {
  fs: FsBundleLoader,
  http: HttpBundleLoader,
}

impl StandardBundleLoader {
  pub fn new(fs: FsBundleLoader, http: HttpBundleLoader) -> Self {
    Self { fs, http }
  }
}

#[async_trait]
impl BundleLoader for StandardBundleLoader {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError> {
    match descriptor.bundle {
      BundleLocation::Path(_) => self.fs.load(descriptor).await,
      BundleLocation::Url(_) => self.http.load(descriptor).await,
    }
  }
}
