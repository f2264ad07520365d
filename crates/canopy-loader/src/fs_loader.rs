use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use canopy_config::{BundleLocation, MicroAppDescriptor};
use tokio::fs;
use tracing::debug;

use crate::catalog::ModuleCatalog;
use crate::error::LoadError;
use crate::loader::{BundleLoader, RawModule};
use crate::manifest::BundleManifest;

const MANIFEST_FILE: &str = "manifest.json";

/// Loads bundles from the local filesystem.
///
/// A location may point at a bundle directory (containing `manifest.json`) or
/// at a manifest file directly. Relative locations resolve against `root`.
pub struct FsBundleLoader {
  root: PathBuf,
  catalog: Arc<ModuleCatalog>,
}

impl FsBundleLoader {
  pub fn new(root: impl Into<PathBuf>, catalog: Arc<ModuleCatalog>) -> Self {
    Self {
      root: root.into(),
      catalog,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Resolve a bundle location to the manifest path it refers to.
  async fn manifest_path(&self, location: &Path) -> PathBuf {
    let path = if location.is_absolute() {
      location.to_path_buf()
    } else {
      self.root.join(location)
    };

    match fs::metadata(&path).await {
      Ok(meta) if meta.is_dir() => path.join(MANIFEST_FILE),
      _ => path,
    }
  }

  async fn read_manifest(&self, slug: &str, path: &Path) -> Result<BundleManifest, LoadError> {
    let content = match fs::read_to_string(path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(LoadError::NotFound {
          slug: slug.to_string(),
          location: path.display().to_string(),
        });
      }
      Err(e) => return Err(e.into()),
    };
    let manifest: BundleManifest = serde_json::from_str(&content)?;
    Ok(manifest)
  }
}

#[async_trait]
impl BundleLoader for FsBundleLoader {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError> {
    let location = match &descriptor.bundle {
      BundleLocation::Path(path) => path,
      other => {
        return Err(LoadError::UnsupportedLocation {
          slug: descriptor.slug.clone(),
          location: other.to_string(),
        });
      }
    };

    let manifest_path = self.manifest_path(location).await;
    debug!(slug = %descriptor.slug, path = %manifest_path.display(), "reading_bundle_manifest");

    let manifest = self.read_manifest(&descriptor.slug, &manifest_path).await?;
    RawModule::resolve(&descriptor.slug, manifest, &self.catalog)
  }
}
