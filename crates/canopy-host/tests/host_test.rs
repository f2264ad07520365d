use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use canopy_bridge::SlotPhase;
use canopy_config::{BundleLocation, HostConfig, MicroAppDescriptor};
use canopy_host::{
  Credentials, FsSessionStore, HostError, HostProviders, MemorySessionStore, Session, SessionStore,
  slices,
};
use canopy_loader::{FsBundleLoader, ModuleCatalog};
use canopy_module::{
  DomType, HostContext, InitError, InitOutcome, MicroAppElement, MicroAppModule, MountContext,
};
use canopy_router::HostRouter;
use canopy_store::Action;
use serde_json::json;
use tempfile::TempDir;

#[derive(Default)]
struct Element {
  contexts: Mutex<Vec<MountContext>>,
}

impl Element {
  fn last(&self) -> Option<MountContext> {
    self.contexts.lock().unwrap().last().cloned()
  }
}

impl MicroAppElement for Element {
  fn update(&self, context: &MountContext) {
    self.contexts.lock().unwrap().push(context.clone());
  }

  fn render(&self) -> String {
    "<ul></ul>".to_string()
  }
}

#[derive(Default)]
struct UsersApp {
  element: Arc<Element>,
}

#[async_trait]
impl MicroAppModule for UsersApp {
  async fn init(&self, host: HostContext) -> Result<InitOutcome, InitError> {
    assert_eq!(host.config["page_size"], 10);
    Ok(InitOutcome {
      dom_type: DomType::Shared,
    })
  }

  fn create_element(&self, _html_tag: &str) -> Arc<dyn MicroAppElement> {
    self.element.clone()
  }
}

struct Fixture {
  _temp: TempDir,
  config: HostConfig,
  loader: Arc<FsBundleLoader>,
  app: Arc<UsersApp>,
}

fn fixture() -> Fixture {
  let temp = TempDir::new().unwrap();
  let bundle = temp.path().join("users");
  std::fs::create_dir_all(&bundle).unwrap();
  std::fs::write(
    bundle.join("manifest.json"),
    json!({ "name": "users", "version": "1.0.0", "entry": "users", "config": { "page_size": 10 } })
      .to_string(),
  )
  .unwrap();

  let app = Arc::new(UsersApp::default());
  let catalog = Arc::new(ModuleCatalog::new().with("users", app.clone()));
  let loader = Arc::new(FsBundleLoader::new(temp.path(), catalog));

  let config = HostConfig {
    micro_apps: vec![MicroAppDescriptor::new(
      "users",
      BundleLocation::parse("users"),
      "users-app",
    )],
    initial_path: "/home".to_string(),
    ..HostConfig::default()
  };

  Fixture {
    _temp: temp,
    config,
    loader,
    app,
  }
}

async fn eventually(check: impl Fn() -> bool) {
  for _ in 0..400 {
    if check() {
      return;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
  }
  panic!("condition not met in time");
}

#[tokio::test]
async fn test_start_restores_session() {
  let f = fixture();
  let sessions = Arc::new(MemorySessionStore::with_session(Session::new("ada", "abc")));

  let host = HostProviders::new(f.config, f.loader)
    .with_session_store(sessions)
    .start()
    .await
    .unwrap();

  assert_eq!(
    host.store().slice_state(slices::SESSION_SLICE),
    json!({ "authenticated": true, "user": "ada" })
  );
  assert_eq!(host.requests().authorization_header().as_deref(), Some("Bearer abc"));
  assert_eq!(host.store().slice_state(slices::ROUTER_SLICE)["pathname"], "/home");
  host.shutdown().await;
}

#[tokio::test]
async fn test_unreadable_session_starts_signed_out() {
  let f = fixture();
  let path = f._temp.path().join("session.json");
  std::fs::write(&path, "{ broken").unwrap();
  let config = HostConfig {
    session_path: Some(path),
    ..f.config
  };

  let host = HostProviders::new(config, f.loader).start().await.unwrap();
  assert_eq!(host.store().slice_state(slices::SESSION_SLICE)["authenticated"], false);
  assert_eq!(host.requests().access_token(), None);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
  let f = fixture();
  let mut config = f.config.clone();
  config.micro_apps.push(config.micro_apps[0].clone());

  let result = HostProviders::new(config, f.loader).start().await;
  assert!(matches!(result, Err(HostError::Config(_))));
}

#[tokio::test]
async fn test_location_sync_both_ways() {
  let f = fixture();
  let host = HostProviders::new(f.config, f.loader).start().await.unwrap();

  host.navigate("/users?page=2");
  eventually(|| host.store().slice_state(slices::ROUTER_SLICE)["pathname"] == "/users").await;
  assert_eq!(host.store().slice_state(slices::ROUTER_SLICE)["search"], "?page=2");

  host.dispatch(slices::push("/roles"));
  eventually(|| host.router().location().pathname == "/roles").await;
  eventually(|| host.store().slice_state(slices::ROUTER_SLICE)["pathname"] == "/roles").await;

  host.dispatch(Action::new(slices::NAVIGATE_BACK));
  eventually(|| host.router().location().pathname == "/users").await;

  host.shutdown().await;
  host.navigate("/after-shutdown");
  tokio::time::sleep(Duration::from_millis(30)).await;
  assert_eq!(host.store().slice_state(slices::ROUTER_SLICE)["pathname"], "/users");
}

#[tokio::test]
async fn test_mount_receives_api_and_session_changes() {
  let f = fixture();
  let temp_session = f._temp.path().join("state").join("session.json");
  let sessions = Arc::new(FsSessionStore::new(&temp_session));
  let host = HostProviders::new(f.config, f.loader)
    .with_session_store(sessions.clone())
    .start()
    .await
    .unwrap();

  let slot = host.mount_page("main", "users", "/users");
  let phase = tokio::time::timeout(Duration::from_secs(5), slot.settled())
    .await
    .unwrap();
  assert_eq!(phase, SlotPhase::Mounted { dom_type: DomType::Shared });

  let element = f.app.element.clone();
  assert_eq!(element.last().unwrap().api.get_access_token(), None);

  let session = host.sign_in(&Credentials::new("ada", "abc")).await.unwrap();
  assert_eq!(sessions.load().await.unwrap(), Some(session));
  eventually(|| element.last().unwrap().api.get_access_token().as_deref() == Some("abc")).await;
  assert_eq!(host.store().slice_state(slices::SESSION_SLICE)["user"], "ada");

  host.set_base_url("https://api.example.com");
  eventually(|| element.last().unwrap().api.default_base_url == "https://api.example.com").await;

  host.sign_out().await.unwrap();
  assert!(!temp_session.exists());
  eventually(|| element.last().unwrap().api.get_access_token().is_none()).await;
  assert_eq!(host.store().slice_state(slices::SESSION_SLICE)["authenticated"], false);

  assert!(host.manager().is_cached("users"));
}

#[tokio::test]
async fn test_failed_sign_in_keeps_session() {
  let f = fixture();
  let host = HostProviders::new(f.config, f.loader).start().await.unwrap();

  let result = host.sign_in(&Credentials::new("ada", "")).await;
  assert!(matches!(result, Err(HostError::SignIn { .. })));
  assert_eq!(host.requests().session(), None);
}

#[tokio::test]
async fn test_panicking_slice_does_not_stop_location_sync() {
  let f = fixture();
  let host = HostProviders::new(f.config, f.loader).start().await.unwrap();

  host.store().register_slice(
    "bad",
    Arc::new(canopy_store::reducer_fn(json!({}), |state, action| {
      if action.is(slices::LOCATION_CHANGED) && action.payload["pathname"] == "/boom" {
        panic!("bad slice");
      }
      state.clone()
    })),
  );

  host.navigate("/boom");
  eventually(|| host.store().slice_state(slices::ROUTER_SLICE)["pathname"] == "/boom").await;
  host.navigate("/after");
  eventually(|| host.store().slice_state(slices::ROUTER_SLICE)["pathname"] == "/after").await;
  assert_eq!(host.store().slice_state("bad"), json!({}));
}
