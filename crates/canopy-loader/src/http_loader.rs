use std::sync::Arc;

use async_trait::async_trait;
use canopy_config::{BundleLocation, MicroAppDescriptor};
use reqwest::Client;
use tracing::debug;

use crate::catalog::ModuleCatalog;
use crate::error::LoadError;
use crate::loader::{BundleLoader, RawModule};
use crate::manifest::BundleManifest;

/// Loads bundle manifests over HTTP(S).
///
/// No timeout is set here; callers configure one on the [`Client`] if they
/// want it.
pub struct HttpBundleLoader {
  client: Client,
  catalog: Arc<ModuleCatalog>,
}

impl HttpBundleLoader {
  pub fn new(catalog: Arc<ModuleCatalog>) -> Self {
    Self::with_client(Client::new(), catalog)
  }

  pub fn with_client(client: Client, catalog: Arc<ModuleCatalog>) -> Self {
    Self { client, catalog }
  }
}

#[async_trait]
impl BundleLoader for HttpBundleLoader {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError> {
    let url = match &descriptor.bundle {
      BundleLocation::Url(url) => url,
      other => {
        return Err(LoadError::UnsupportedLocation {
          slug: descriptor.slug.clone(),
          location: other.to_string(),
        });
      }
    };

    debug!(slug = %descriptor.slug, url = %url, "fetching_bundle_manifest");
    let response = self.client.get(url).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
      return Err(LoadError::NotFound {
        slug: descriptor.slug.clone(),
        location: url.clone(),
      });
    }
    if !status.is_success() {
      return Err(LoadError::HttpStatus {
        slug: descriptor.slug.clone(),
        status: status.as_u16(),
      });
    }

    let body = response.text().await?;
    let manifest: BundleManifest = serde_json::from_str(&body)?;
    RawModule::resolve(&descriptor.slug, manifest, &self.catalog)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_path_location_rejected() {
    let loader = HttpBundleLoader::new(Arc::new(ModuleCatalog::new()));
    let descriptor =
      MicroAppDescriptor::new("users", BundleLocation::parse("bundles/users"), "users-app");

    let result = loader.load(&descriptor).await;
    assert!(matches!(result, Err(LoadError::UnsupportedLocation { slug, .. }) if slug == "users"));
  }
}
