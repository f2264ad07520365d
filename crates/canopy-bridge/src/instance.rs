use std::sync::Arc;

use canopy_module::{ApiContext, DomType, MicroAppElement, MountContext, RoutingContext};
use canopy_router::{HostRouter, Navigator};

/// A mounted micro-app element and the last context it received.
pub(crate) struct MountedInstance {
  pub(crate) html_tag: String,
  pub(crate) dom_type: DomType,
  pub(crate) element: Arc<dyn MicroAppElement>,
  pub(crate) context: Option<MountContext>,
  revision: u64,
}

impl MountedInstance {
  pub(crate) fn new(html_tag: String, dom_type: DomType, element: Arc<dyn MicroAppElement>) -> Self {
    Self {
      html_tag,
      dom_type,
      element,
      context: None,
      revision: 0,
    }
  }

  /// Build the next snapshot. Revisions start at 1 and never repeat.
  pub(crate) fn next_context(
    &mut self,
    base_path: &str,
    router: Option<&Arc<dyn HostRouter>>,
    api: ApiContext,
  ) -> MountContext {
    self.revision += 1;
    let routing = router.map(|router| RoutingContext {
      base_path: base_path.to_string(),
      location: router.location(),
      navigator: Navigator::new(router.clone(), base_path),
    });
    MountContext {
      revision: self.revision,
      routing,
      api,
    }
  }
}
