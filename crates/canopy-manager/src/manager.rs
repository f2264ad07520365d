use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use canopy_config::MicroAppDescriptor;
use canopy_loader::BundleLoader;
use canopy_store::Store;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, error, info, instrument};

use crate::error::ManagerError;
use crate::package::LoadedPackage;

type LoadResult = Result<Arc<LoadedPackage>, ManagerError>;
type LoadFuture = Shared<BoxFuture<'static, LoadResult>>;

enum CacheEntry {
  /// A load is in flight. `attempt` tells a stale completion from the current one.
  Loading { attempt: u64, future: LoadFuture },
  Ready(Arc<LoadedPackage>),
}

type Cache = Arc<Mutex<HashMap<String, CacheEntry>>>;

/// Loads and caches micro-app packages by slug.
///
/// Loads are driven by whoever awaits them: if every waiter goes away the load
/// pauses and the next caller for the slug resumes it.
pub struct MicroAppManager {
  loader: Arc<dyn BundleLoader>,
  store: Arc<Store>,
  descriptors: HashMap<String, MicroAppDescriptor>,
  cache: Cache,
  next_attempt: AtomicU64,
}

impl MicroAppManager {
  pub fn new(
    loader: Arc<dyn BundleLoader>,
    store: Arc<Store>,
    descriptors: impl IntoIterator<Item = MicroAppDescriptor>,
  ) -> Self {
    let descriptors = descriptors
      .into_iter()
      .map(|d| (d.slug.clone(), d))
      .collect();
    Self {
      loader,
      store,
      descriptors,
      cache: Arc::new(Mutex::new(HashMap::new())),
      next_attempt: AtomicU64::new(0),
    }
  }

  /// Return the package for `slug`, loading it at most once at a time.
  #[instrument(name = "fetch_micro_app", skip(self))]
  pub async fn fetch_micro_app(&self, slug: &str) -> LoadResult {
    let future = {
      let mut cache = lock(&self.cache);
      match cache.get(slug) {
        Some(CacheEntry::Ready(package)) => {
          debug!(slug = %slug, "micro_app_cache_hit");
          return Ok(package.clone());
        }
        Some(CacheEntry::Loading { future, .. }) => {
          debug!(slug = %slug, "micro_app_load_joined");
          future.clone()
        }
        None => {
          let descriptor =
            self
              .descriptors
              .get(slug)
              .cloned()
              .ok_or_else(|| ManagerError::UnknownMicroApp {
                slug: slug.to_string(),
              })?;
          let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed);
          let future = self.start_load(descriptor, attempt);
          cache.insert(
            slug.to_string(),
            CacheEntry::Loading {
              attempt,
              future: future.clone(),
            },
          );
          future
        }
      }
    };

    future.await
  }

  fn start_load(&self, descriptor: MicroAppDescriptor, attempt: u64) -> LoadFuture {
    let loader = self.loader.clone();
    let store = self.store.clone();
    let cache = self.cache.clone();

    async move {
      let slug = descriptor.slug.clone();
      info!(slug = %slug, bundle = %descriptor.bundle, attempt, "micro_app_load_started");

      // A panicking loader must not poison the shared future.
      let result = match AssertUnwindSafe(loader.load(&descriptor)).catch_unwind().await {
        Ok(Ok(raw)) => Ok(Arc::new(LoadedPackage::new(descriptor, raw, store))),
        Ok(Err(e)) => Err(ManagerError::Load {
          slug: slug.clone(),
          source: Arc::new(e),
        }),
        Err(payload) => Err(ManagerError::LoaderPanicked {
          slug: slug.clone(),
          message: panic_message(payload.as_ref()),
        }),
      };

      let mut cache = lock(&cache);
      let current = matches!(
        cache.get(&slug),
        Some(CacheEntry::Loading { attempt: a, .. }) if *a == attempt
      );
      match &result {
        Ok(package) => {
          info!(slug = %slug, version = %package.manifest.version, "micro_app_loaded");
          if current {
            cache.insert(slug, CacheEntry::Ready(package.clone()));
          }
        }
        Err(e) => {
          error!(slug = %slug, error = %e, "micro_app_load_failed");
          if current {
            cache.remove(&slug);
          }
        }
      }

      result
    }
    .boxed()
    .shared()
  }

  /// Returns true if a loaded package for `slug` is cached.
  pub fn is_cached(&self, slug: &str) -> bool {
    matches!(lock(&self.cache).get(slug), Some(CacheEntry::Ready(_)))
  }

  /// Returns true if a load for `slug` is in flight.
  pub fn is_loading(&self, slug: &str) -> bool {
    matches!(lock(&self.cache).get(slug), Some(CacheEntry::Loading { .. }))
  }

  pub fn descriptor(&self, slug: &str) -> Option<&MicroAppDescriptor> {
    self.descriptors.get(slug)
  }

  /// Configured descriptors, sorted by slug.
  pub fn descriptors(&self) -> Vec<&MicroAppDescriptor> {
    let mut descriptors: Vec<_> = self.descriptors.values().collect();
    descriptors.sort_by(|a, b| a.slug.cmp(&b.slug));
    descriptors
  }

  pub fn store(&self) -> &Arc<Store> {
    &self.store
  }
}

fn lock(cache: &Cache) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
  cache.lock().unwrap_or_else(|e| e.into_inner())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  payload
    .downcast_ref::<&str>()
    .map(|s| s.to_string())
    .or_else(|| payload.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "loader panicked".to_string())
}
