use std::fmt;
use std::sync::Arc;

use canopy_manager::MicroAppManager;
use canopy_module::ApiContext;
use canopy_router::HostRouter;
use tokio::sync::watch;

use crate::slot::MountSlot;

/// Shared dependencies every slot needs: the manager, the API context source
/// and, when the host has one, the router.
#[derive(Clone)]
pub struct MountBridge {
  pub(crate) manager: Arc<MicroAppManager>,
  pub(crate) router: Option<Arc<dyn HostRouter>>,
  pub(crate) api: watch::Receiver<ApiContext>,
}

impl MountBridge {
  /// A bridge outside any router context. Mounted instances get no routing.
  pub fn new(manager: Arc<MicroAppManager>, api: watch::Receiver<ApiContext>) -> Self {
    Self {
      manager,
      router: None,
      api,
    }
  }

  pub fn with_router(mut self, router: Arc<dyn HostRouter>) -> Self {
    self.router = Some(router);
    self
  }

  /// Create an idle slot for `slug` mounted at the root path.
  pub fn slot(&self, slot_id: impl Into<String>, slug: impl Into<String>) -> MountSlot {
    self.page(slot_id, slug, "/")
  }

  /// Create an idle slot for `slug` whose routes live under `base_path`.
  pub fn page(
    &self,
    slot_id: impl Into<String>,
    slug: impl Into<String>,
    base_path: impl Into<String>,
  ) -> MountSlot {
    MountSlot::new(self.clone(), slot_id.into(), slug.into(), base_path.into())
  }

  pub fn manager(&self) -> &Arc<MicroAppManager> {
    &self.manager
  }

  pub fn has_router(&self) -> bool {
    self.router.is_some()
  }
}

impl fmt::Debug for MountBridge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MountBridge")
      .field("has_router", &self.router.is_some())
      .finish_non_exhaustive()
  }
}
