use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard};

use canopy_module::{DomType, MicroAppElement, MountContext};
use futures::FutureExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::MountBridge;
use crate::error::{SlotError, SlotErrorKind};
use crate::instance::MountedInstance;
use crate::phase::{SlotPhase, SlotView};

struct SlotState {
  /// Token of the current attempt, if one was started.
  attempt: Option<CancellationToken>,
  instance: Option<MountedInstance>,
}

struct SlotShared {
  id: String,
  slug: String,
  base_path: String,
  /// Cancelled on unmount. Every attempt token is a child of it.
  lifetime: CancellationToken,
  state: Mutex<SlotState>,
  phase: watch::Sender<SlotPhase>,
}

impl SlotShared {
  fn lock(&self) -> MutexGuard<'_, SlotState> {
    self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Move to `phase` unless the attempt is stale or the slot is gone.
  fn transition(&self, attempt: &CancellationToken, phase: SlotPhase) -> bool {
    let _state = self.lock();
    if attempt.is_cancelled() {
      debug!(slot_id = %self.id, slug = %self.slug, phase = phase.name(), "slot_transition_discarded");
      return false;
    }
    debug!(slot_id = %self.id, slug = %self.slug, phase = phase.name(), "slot_phase_changed");
    self.phase.send_replace(phase);
    true
  }

  /// Install the element, give it its first context and report Mounted.
  fn mount(
    &self,
    attempt: &CancellationToken,
    bridge: &MountBridge,
    html_tag: String,
    dom_type: DomType,
    element: Arc<dyn MicroAppElement>,
  ) -> bool {
    let mut state = self.lock();
    if attempt.is_cancelled() {
      return false;
    }

    state.instance = Some(MountedInstance::new(html_tag, dom_type, element));
    if !self.push_locked(&mut state, bridge) {
      return false;
    }

    info!(slot_id = %self.id, slug = %self.slug, dom_type = ?dom_type, "slot_mounted");
    self.phase.send_replace(SlotPhase::Mounted { dom_type });
    true
  }

  /// Push the latest context into the mounted element.
  fn push_context(&self, attempt: &CancellationToken, bridge: &MountBridge) -> bool {
    let mut state = self.lock();
    if attempt.is_cancelled() {
      return false;
    }
    self.push_locked(&mut state, bridge)
  }

  fn push_locked(&self, state: &mut SlotState, bridge: &MountBridge) -> bool {
    let Some(instance) = state.instance.as_mut() else {
      return false;
    };

    let api = bridge.api.borrow().clone();
    let context = instance.next_context(&self.base_path, bridge.router.as_ref(), api);
    let element = instance.element.clone();

    match catch_unwind(AssertUnwindSafe(|| element.update(&context))) {
      Ok(()) => {
        debug!(
          slot_id = %self.id,
          slug = %self.slug,
          revision = context.revision,
          "slot_context_pushed"
        );
        instance.context = Some(context);
        true
      }
      Err(payload) => {
        let error = SlotError::panicked(SlotErrorKind::Render, &self.slug, payload.as_ref());
        warn!(slot_id = %self.id, slug = %self.slug, error = %error, "slot_render_failed");
        state.instance = None;
        self.phase.send_replace(SlotPhase::Failed(error));
        false
      }
    }
  }
}

/// One UI location hosting one micro-app.
///
/// Dropping the slot unmounts it.
pub struct MountSlot {
  bridge: MountBridge,
  shared: Arc<SlotShared>,
}

impl MountSlot {
  pub(crate) fn new(bridge: MountBridge, id: String, slug: String, base_path: String) -> Self {
    let (phase, _) = watch::channel(SlotPhase::Idle);
    Self {
      bridge,
      shared: Arc::new(SlotShared {
        id,
        slug,
        base_path,
        lifetime: CancellationToken::new(),
        state: Mutex::new(SlotState {
          attempt: None,
          instance: None,
        }),
        phase,
      }),
    }
  }

  pub fn id(&self) -> &str {
    &self.shared.id
  }

  pub fn slug(&self) -> &str {
    &self.shared.slug
  }

  pub fn base_path(&self) -> &str {
    &self.shared.base_path
  }

  /// Ask for the micro-app. Starts fetching the first time; every later call
  /// is a no-op, so re-rendering the surrounding UI never re-fetches or
  /// re-initializes. Must be called inside a tokio runtime.
  pub fn request(&self) {
    let mut state = self.shared.lock();
    if self.shared.lifetime.is_cancelled() || state.attempt.is_some() {
      return;
    }
    self.start(&mut state);
  }

  /// Start a fresh attempt after a failure. Returns false (and does nothing)
  /// unless the slot is in the failed phase.
  pub fn remount(&self) -> bool {
    let mut state = self.shared.lock();
    if self.shared.lifetime.is_cancelled() || !matches!(self.phase(), SlotPhase::Failed(_)) {
      return false;
    }
    if let Some(previous) = state.attempt.take() {
      previous.cancel();
    }
    info!(slot_id = %self.shared.id, slug = %self.shared.slug, "slot_remount_requested");
    self.start(&mut state);
    true
  }

  fn start(&self, state: &mut SlotState) {
    let attempt = self.shared.lifetime.child_token();
    state.attempt = Some(attempt.clone());
    state.instance = None;
    self.shared.phase.send_replace(SlotPhase::Fetching);

    info!(slot_id = %self.shared.id, slug = %self.shared.slug, "slot_fetch_started");
    tokio::spawn(drive(self.bridge.clone(), self.shared.clone(), attempt));
  }

  /// Remove the slot. Late fetch or init results are discarded and the phase
  /// is frozen from here on.
  pub fn unmount(&self) {
    let instance = {
      let mut state = self.shared.lock();
      if self.shared.lifetime.is_cancelled() {
        return;
      }
      self.shared.lifetime.cancel();
      state.attempt = None;
      state.instance.take()
    };

    if let Some(instance) = instance {
      instance.element.unmount();
    }
    info!(slot_id = %self.shared.id, slug = %self.shared.slug, "slot_unmounted");
  }

  pub fn is_unmounted(&self) -> bool {
    self.shared.lifetime.is_cancelled()
  }

  pub fn phase(&self) -> SlotPhase {
    self.shared.phase.borrow().clone()
  }

  pub fn watch_phase(&self) -> watch::Receiver<SlotPhase> {
    self.shared.phase.subscribe()
  }

  /// Wait until the slot is mounted or failed, or until it is unmounted.
  pub async fn settled(&self) -> SlotPhase {
    let mut rx = self.shared.phase.subscribe();
    loop {
      {
        let phase = rx.borrow_and_update();
        if phase.is_settled() {
          return phase.clone();
        }
      }
      tokio::select! {
        _ = self.shared.lifetime.cancelled() => return self.phase(),
        changed = rx.changed() => {
          if changed.is_err() {
            return self.phase();
          }
        }
      }
    }
  }

  /// Last context pushed into the mounted element.
  pub fn context(&self) -> Option<MountContext> {
    self
      .shared
      .lock()
      .instance
      .as_ref()
      .and_then(|instance| instance.context.clone())
  }

  pub fn dom_type(&self) -> Option<DomType> {
    self
      .shared
      .lock()
      .instance
      .as_ref()
      .map(|instance| instance.dom_type)
  }

  /// What the slot currently shows in the host tree. A panic while rendering
  /// fails the slot instead of reaching the caller.
  pub fn view(&self) -> SlotView {
    let mut state = self.shared.lock();
    if self.shared.lifetime.is_cancelled() {
      return SlotView::Idle;
    }

    let phase = self.shared.phase.borrow().clone();
    match phase {
      SlotPhase::Idle => SlotView::Idle,
      SlotPhase::Fetching | SlotPhase::Initializing => SlotView::Loading {
        slug: self.shared.slug.clone(),
      },
      SlotPhase::Failed(error) => SlotView::Error((&error).into()),
      SlotPhase::Mounted { .. } => {
        let Some(instance) = state.instance.as_ref() else {
          return SlotView::Idle;
        };
        let tag = instance.html_tag.clone();
        if instance.dom_type == DomType::Isolated {
          return SlotView::Isolated { tag };
        }

        let element = instance.element.clone();
        match catch_unwind(AssertUnwindSafe(|| element.render())) {
          Ok(content) => SlotView::Shared { tag, content },
          Err(payload) => {
            let error = SlotError::panicked(SlotErrorKind::Render, &self.shared.slug, payload.as_ref());
            warn!(slot_id = %self.shared.id, slug = %self.shared.slug, error = %error, "slot_render_failed");
            state.instance = None;
            self.shared.phase.send_replace(SlotPhase::Failed(error.clone()));
            SlotView::Error((&error).into())
          }
        }
      }
    }
  }
}

impl Drop for MountSlot {
  fn drop(&mut self) {
    self.unmount();
  }
}

impl fmt::Debug for MountSlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MountSlot")
      .field("id", &self.shared.id)
      .field("slug", &self.shared.slug)
      .field("phase", &self.phase().name())
      .finish()
  }
}

enum Change {
  Cancelled,
  Location(bool),
  Api(bool),
}

/// Run one mount attempt to completion, then keep the element's context fresh.
async fn drive(bridge: MountBridge, shared: Arc<SlotShared>, attempt: CancellationToken) {
  let slug = shared.slug.clone();

  let fetched = tokio::select! {
    biased;
    _ = attempt.cancelled() => {
      debug!(slot_id = %shared.id, slug = %slug, "slot_fetch_discarded");
      return;
    }
    result = bridge.manager.fetch_micro_app(&slug) => result,
  };

  let package = match fetched {
    Ok(package) => package,
    Err(e) => {
      warn!(slot_id = %shared.id, slug = %slug, error = %e, "slot_fetch_failed");
      shared.transition(&attempt, SlotPhase::Failed(SlotError::load(&slug, &e)));
      return;
    }
  };

  if !shared.transition(&attempt, SlotPhase::Initializing) {
    return;
  }

  let initialized = tokio::select! {
    biased;
    _ = attempt.cancelled() => {
      debug!(slot_id = %shared.id, slug = %slug, "slot_init_discarded");
      return;
    }
    result = AssertUnwindSafe(package.init()).catch_unwind() => result,
  };

  let outcome = match initialized {
    Ok(Ok(outcome)) => outcome,
    Ok(Err(e)) => {
      warn!(slot_id = %shared.id, slug = %slug, error = %e, "slot_init_failed");
      shared.transition(&attempt, SlotPhase::Failed(SlotError::init(&slug, &e)));
      return;
    }
    Err(payload) => {
      let error = SlotError::panicked(SlotErrorKind::Init, &slug, payload.as_ref());
      warn!(slot_id = %shared.id, slug = %slug, error = %error, "slot_init_failed");
      shared.transition(&attempt, SlotPhase::Failed(error));
      return;
    }
  };

  let element = match catch_unwind(AssertUnwindSafe(|| package.create_element())) {
    Ok(element) => element,
    Err(payload) => {
      let error = SlotError::panicked(SlotErrorKind::Render, &slug, payload.as_ref());
      warn!(slot_id = %shared.id, slug = %slug, error = %error, "slot_render_failed");
      shared.transition(&attempt, SlotPhase::Failed(error));
      return;
    }
  };

  // Subscribe before the first push so no change between the two is missed.
  let mut location_rx = bridge.router.as_ref().map(|router| router.subscribe());
  let mut api_rx = Some(bridge.api.clone());
  mark_seen(&mut location_rx);
  mark_seen(&mut api_rx);

  let html_tag = package.html_tag().to_string();
  if !shared.mount(&attempt, &bridge, html_tag, outcome.dom_type, element) {
    return;
  }

  loop {
    let change = tokio::select! {
      biased;
      _ = attempt.cancelled() => Change::Cancelled,
      alive = changed(&mut location_rx) => Change::Location(alive),
      alive = changed(&mut api_rx) => Change::Api(alive),
    };

    match change {
      Change::Cancelled => break,
      Change::Location(false) => {
        location_rx = None;
        continue;
      }
      Change::Api(false) => {
        api_rx = None;
        continue;
      }
      Change::Location(true) | Change::Api(true) => {}
    }

    // Both sources are read at push time; collapse whatever else changed.
    mark_seen(&mut location_rx);
    mark_seen(&mut api_rx);

    if !shared.push_context(&attempt, &bridge) {
      break;
    }
  }

  debug!(slot_id = %shared.id, slug = %slug, "slot_context_watch_stopped");
}

async fn changed<T>(rx: &mut Option<watch::Receiver<T>>) -> bool {
  match rx {
    Some(rx) => rx.changed().await.is_ok(),
    None => std::future::pending().await,
  }
}

fn mark_seen<T>(rx: &mut Option<watch::Receiver<T>>) {
  if let Some(rx) = rx {
    rx.borrow_and_update();
  }
}
