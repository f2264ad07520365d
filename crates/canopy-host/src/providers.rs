use std::fmt;
use std::sync::{Arc, Mutex};

use canopy_bridge::{MountBridge, MountSlot};
use canopy_config::HostConfig;
use canopy_loader::BundleLoader;
use canopy_manager::MicroAppManager;
use canopy_router::{HostRouter, MemoryRouter};
use canopy_store::{Action, Store};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{AuthStrategy, BearerAuth, Credentials};
use crate::error::HostError;
use crate::location::LocationSync;
use crate::request::RequestLayer;
use crate::session::{FsSessionStore, MemorySessionStore, Session, SessionStore};
use crate::slices::{
  ROUTER_SLICE, SESSION_RESTORED, SESSION_SIGNED_IN, SESSION_SIGNED_OUT, SESSION_SLICE,
  router_reducer, session_reducer,
};

/// Everything the host needs before it can start.
///
/// Defaults: [`BearerAuth`], a [`MemoryRouter`] at `config.initial_path`, and
/// an [`FsSessionStore`] at `config.session_path` (in-memory when unset).
pub struct HostProviders {
  config: HostConfig,
  loader: Arc<dyn BundleLoader>,
  auth: Arc<dyn AuthStrategy>,
  session_store: Option<Arc<dyn SessionStore>>,
  router: Option<Arc<dyn HostRouter>>,
}

impl HostProviders {
  pub fn new(config: HostConfig, loader: Arc<dyn BundleLoader>) -> Self {
    Self {
      config,
      loader,
      auth: Arc::new(BearerAuth),
      session_store: None,
      router: None,
    }
  }

  pub fn with_auth(mut self, auth: Arc<dyn AuthStrategy>) -> Self {
    self.auth = auth;
    self
  }

  pub fn with_session_store(mut self, session_store: Arc<dyn SessionStore>) -> Self {
    self.session_store = Some(session_store);
    self
  }

  pub fn with_router(mut self, router: Arc<dyn HostRouter>) -> Self {
    self.router = Some(router);
    self
  }

  /// Bring the host up. Must be called inside a tokio runtime.
  ///
  /// A session that cannot be restored is logged and skipped; the host starts
  /// signed out.
  pub async fn start(self) -> Result<Host, HostError> {
    self.config.validate()?;

    let store = Store::builder()
      .slice(ROUTER_SLICE, router_reducer())
      .slice(SESSION_SLICE, session_reducer())
      .build();
    info!(slices = ?store.slice_names(), "store_ready");

    let requests = Arc::new(RequestLayer::new(
      self.config.api.base_url.clone(),
      self.auth,
    ));
    info!(base_url = %requests.base_url(), "request_layer_ready");

    let session_store = self
      .session_store
      .unwrap_or_else(|| default_session_store(&self.config));
    match session_store.load().await {
      Ok(Some(session)) => {
        info!(user = %session.user, "session_restored");
        let user = session.user.clone();
        requests.set_session(Some(session));
        store.dispatch(Action::with_payload(SESSION_RESTORED, json!({ "user": user })));
      }
      Ok(None) => debug!("no_session_to_restore"),
      Err(e) => warn!(error = %e, "session_restore_failed"),
    }

    let router: Arc<dyn HostRouter> = match self.router {
      Some(router) => router,
      None => Arc::new(MemoryRouter::new(&self.config.initial_path)),
    };
    let cancel = CancellationToken::new();
    let sync = LocationSync::new(store.clone(), router.clone()).spawn(cancel.child_token());

    let manager = Arc::new(MicroAppManager::new(
      self.loader,
      store.clone(),
      self.config.micro_apps.clone(),
    ));
    let bridge = MountBridge::new(manager.clone(), requests.subscribe()).with_router(router.clone());

    info!(micro_apps = self.config.micro_apps.len(), "host_started");
    Ok(Host {
      config: self.config,
      store,
      manager,
      bridge,
      requests,
      router,
      session_store,
      cancel,
      sync: Mutex::new(Some(sync)),
    })
  }
}

fn default_session_store(config: &HostConfig) -> Arc<dyn SessionStore> {
  match &config.session_path {
    Some(path) => Arc::new(FsSessionStore::new(path)),
    None => Arc::new(MemorySessionStore::new()),
  }
}

/// A running host.
pub struct Host {
  config: HostConfig,
  store: Arc<Store>,
  manager: Arc<MicroAppManager>,
  bridge: MountBridge,
  requests: Arc<RequestLayer>,
  router: Arc<dyn HostRouter>,
  session_store: Arc<dyn SessionStore>,
  cancel: CancellationToken,
  sync: Mutex<Option<JoinHandle<()>>>,
}

impl Host {
  /// Mount `slug` into a new slot at the root path and start fetching it.
  pub fn mount(&self, slot_id: impl Into<String>, slug: impl Into<String>) -> MountSlot {
    let slot = self.bridge.slot(slot_id, slug);
    slot.request();
    slot
  }

  /// Mount `slug` as a page whose routes live under `base_path`.
  pub fn mount_page(
    &self,
    slot_id: impl Into<String>,
    slug: impl Into<String>,
    base_path: impl Into<String>,
  ) -> MountSlot {
    let slot = self.bridge.page(slot_id, slug, base_path);
    slot.request();
    slot
  }

  /// Push a new location onto the host router.
  pub fn navigate(&self, to: &str) {
    self.router.push(to);
  }

  pub fn dispatch(&self, action: Action) {
    self.store.dispatch(action);
  }

  /// Sign in, persist the session and hand the new token to every mounted
  /// micro-app.
  pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, HostError> {
    let session = self.requests.auth().sign_in(credentials).await?;
    self.session_store.save(&session).await?;
    self.requests.set_session(Some(session.clone()));
    self.store.dispatch(Action::with_payload(
      SESSION_SIGNED_IN,
      json!({ "user": session.user }),
    ));
    info!(user = %session.user, "signed_in");
    Ok(session)
  }

  pub async fn sign_out(&self) -> Result<(), HostError> {
    self.session_store.clear().await?;
    self.requests.set_session(None);
    self.store.dispatch(Action::new(SESSION_SIGNED_OUT));
    info!("signed_out");
    Ok(())
  }

  pub fn set_base_url(&self, base_url: impl Into<String>) {
    self.requests.set_base_url(base_url);
  }

  /// Stop the location sync. Slots stay usable until dropped.
  pub async fn shutdown(&self) {
    self.cancel.cancel();
    let sync = self.sync.lock().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(handle) = sync
      && let Err(e) = handle.await
    {
      warn!(error = %e, "location_sync_join_failed");
    }
    info!("host_stopped");
  }

  pub fn config(&self) -> &HostConfig {
    &self.config
  }

  pub fn store(&self) -> &Arc<Store> {
    &self.store
  }

  pub fn manager(&self) -> &Arc<MicroAppManager> {
    &self.manager
  }

  pub fn bridge(&self) -> &MountBridge {
    &self.bridge
  }

  pub fn requests(&self) -> &Arc<RequestLayer> {
    &self.requests
  }

  pub fn router(&self) -> &Arc<dyn HostRouter> {
    &self.router
  }
}

impl Drop for Host {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}

impl fmt::Debug for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Host")
      .field("micro_apps", &self.config.micro_apps.len())
      .field("requests", &self.requests)
      .finish_non_exhaustive()
  }
}
