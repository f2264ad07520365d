//! Integration tests for MicroAppManager single-flight loading and caching.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use canopy_config::{BundleLocation, MicroAppDescriptor};
use canopy_loader::{BundleLoader, BundleManifest, LoadError, RawModule};
use canopy_manager::{ManagerError, MicroAppManager};
use canopy_module::{
  HostContext, InitError, InitOutcome, MicroAppElement, MicroAppModule, MountContext,
};
use canopy_store::{Store, reducer_fn};
use serde_json::json;
use tokio::sync::Semaphore;

struct NullElement;

impl MicroAppElement for NullElement {
  fn update(&self, _context: &MountContext) {}

  fn render(&self) -> String {
    String::new()
  }
}

/// Registers a slice and reports a shared mount.
struct SliceApp {
  init_calls: AtomicUsize,
}

#[async_trait]
impl MicroAppModule for SliceApp {
  async fn init(&self, host: HostContext) -> Result<InitOutcome, InitError> {
    self.init_calls.fetch_add(1, Ordering::SeqCst);
    host
      .register_reducer
      .register(Arc::new(reducer_fn(json!({ "config": host.config }), |s, _| s.clone())));
    Ok(InitOutcome::shared())
  }

  fn create_element(&self, _html_tag: &str) -> Arc<dyn MicroAppElement> {
    Arc::new(NullElement)
  }
}

/// Loader that counts calls, can fail on demand and can hold loads until released.
struct TestLoader {
  module: Arc<SliceApp>,
  calls: AtomicUsize,
  fail: AtomicBool,
  panic_next: AtomicBool,
  gate: Option<Semaphore>,
}

impl TestLoader {
  fn open() -> Self {
    Self {
      module: Arc::new(SliceApp {
        init_calls: AtomicUsize::new(0),
      }),
      calls: AtomicUsize::new(0),
      fail: AtomicBool::new(false),
      panic_next: AtomicBool::new(false),
      gate: None,
    }
  }

  fn gated() -> Self {
    Self {
      gate: Some(Semaphore::new(0)),
      ..Self::open()
    }
  }

  fn release(&self) {
    if let Some(gate) = &self.gate {
      gate.add_permits(1);
    }
  }

  fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl BundleLoader for TestLoader {
  async fn load(&self, descriptor: &MicroAppDescriptor) -> Result<RawModule, LoadError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(gate) = &self.gate {
      gate.acquire().await.expect("gate closed").forget();
    }
    if self.panic_next.swap(false, Ordering::SeqCst) {
      panic!("bundle loader exploded");
    }
    if self.fail.load(Ordering::SeqCst) {
      return Err(LoadError::NotFound {
        slug: descriptor.slug.clone(),
        location: descriptor.bundle.to_string(),
      });
    }
    Ok(RawModule {
      manifest: BundleManifest {
        name: descriptor.slug.clone(),
        version: "1.0.0".to_string(),
        entry: descriptor.slug.clone(),
        config: json!({ "page_size": 20, "theme": "light" }),
      },
      module: self.module.clone(),
    })
  }
}

fn descriptors() -> Vec<MicroAppDescriptor> {
  vec![
    MicroAppDescriptor::new("authorize", BundleLocation::parse("bundles/authorize"), "authorize-app")
      .with_config(json!({ "theme": "dark" })),
    MicroAppDescriptor::new("users", BundleLocation::parse("bundles/users"), "users-app"),
  ]
}

fn manager(loader: Arc<TestLoader>) -> MicroAppManager {
  MicroAppManager::new(loader, Store::new(), descriptors())
}

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
  let loader = Arc::new(TestLoader::open());
  let manager = manager(loader.clone());

  let first = manager.fetch_micro_app("authorize").await.unwrap();
  let second = manager.fetch_micro_app("authorize").await.unwrap();

  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(loader.calls(), 1);
  assert!(manager.is_cached("authorize"));
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_load() {
  let loader = Arc::new(TestLoader::gated());
  let manager = manager(loader.clone());

  let fetches = futures::future::join_all((0..5).map(|_| manager.fetch_micro_app("authorize")));
  let release = async {
    tokio::task::yield_now().await;
    assert!(manager.is_loading("authorize"));
    loader.release();
  };
  let (results, ()) = tokio::join!(fetches, release);

  let packages: Vec<_> = results.into_iter().map(|r| r.unwrap()).collect();
  assert_eq!(loader.calls(), 1);
  for package in &packages[1..] {
    assert!(Arc::ptr_eq(&packages[0], package));
  }
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached_and_retries() {
  let loader = Arc::new(TestLoader::open());
  loader.fail.store(true, Ordering::SeqCst);
  let manager = manager(loader.clone());

  let result = manager.fetch_micro_app("users").await;
  assert!(matches!(result, Err(ManagerError::Load { ref slug, .. }) if slug == "users"));
  assert!(!manager.is_cached("users"));
  assert!(!manager.is_loading("users"));

  loader.fail.store(false, Ordering::SeqCst);
  let package = manager.fetch_micro_app("users").await.unwrap();
  assert_eq!(package.slug(), "users");
  assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn test_failed_load_rejects_every_waiter() {
  let loader = Arc::new(TestLoader::gated());
  loader.fail.store(true, Ordering::SeqCst);
  let manager = manager(loader.clone());

  let fetches = futures::future::join_all((0..3).map(|_| manager.fetch_micro_app("users")));
  let release = async {
    tokio::task::yield_now().await;
    loader.release();
  };
  let (results, ()) = tokio::join!(fetches, release);

  assert_eq!(loader.calls(), 1);
  assert!(results.iter().all(|r| r.is_err()));
}

#[tokio::test]
async fn test_unknown_slug() {
  let loader = Arc::new(TestLoader::open());
  let manager = manager(loader.clone());

  let result = manager.fetch_micro_app("ghost").await;
  assert!(matches!(result, Err(ManagerError::UnknownMicroApp { .. })));
  assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_manager_never_calls_init() {
  let loader = Arc::new(TestLoader::open());
  let manager = manager(loader.clone());

  manager.fetch_micro_app("authorize").await.unwrap();
  assert_eq!(loader.module.init_calls.load(Ordering::SeqCst), 0);
  assert!(!manager.store().contains_slice("authorize"));
}

#[tokio::test]
async fn test_init_registers_slice_under_slug_with_merged_config() {
  let loader = Arc::new(TestLoader::open());
  let manager = manager(loader.clone());

  let package = manager.fetch_micro_app("authorize").await.unwrap();
  assert_eq!(package.config, json!({ "page_size": 20, "theme": "dark" }));

  let outcome = package.init().await.unwrap();
  assert_eq!(outcome, InitOutcome::shared());
  assert_eq!(
    manager.store().slice_state("authorize"),
    json!({ "config": { "page_size": 20, "theme": "dark" } })
  );
}

#[tokio::test]
async fn test_loader_panic_rejects_waiters_and_retries() {
  let loader = Arc::new(TestLoader::gated());
  loader.panic_next.store(true, Ordering::SeqCst);
  let manager = manager(loader.clone());

  let (first, second, _) = tokio::join!(
    manager.fetch_micro_app("users"),
    manager.fetch_micro_app("users"),
    async {
      tokio::task::yield_now().await;
      loader.release();
    }
  );

  for result in [first, second] {
    assert!(matches!(
      result,
      Err(ManagerError::LoaderPanicked { ref message, .. }) if message == "bundle loader exploded"
    ));
  }
  assert!(!manager.is_loading("users"));
  assert!(!manager.is_cached("users"));

  loader.release();
  let package = manager.fetch_micro_app("users").await.unwrap();
  assert_eq!(package.slug(), "users");
  assert_eq!(loader.calls(), 2);
}
