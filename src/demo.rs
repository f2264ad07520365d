//! Micro-apps compiled into the `canopy` binary.
//!
//! A bundle manifest whose `entry` is `demo-shared` or `demo-isolated` resolves
//! to one of these.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use canopy_loader::ModuleCatalog;
use canopy_module::{
  DomType, HostContext, InitError, InitOutcome, MicroAppElement, MicroAppModule, MountContext,
};
use canopy_store::{RegistrationHandle, reducer_fn};
use serde_json::json;

pub fn catalog() -> ModuleCatalog {
  ModuleCatalog::new()
    .with("demo-shared", Arc::new(DemoApp::new(DomType::Shared)))
    .with("demo-isolated", Arc::new(DemoApp::new(DomType::Isolated)))
}

/// Counts the navigations it has seen in its own slice and renders the
/// current path.
///
/// One module can back several micro-apps. Handles are kept per html tag,
/// which the host config keeps unique, so each element reads its own slice.
struct DemoApp {
  dom_type: DomType,
  handles: Mutex<HashMap<String, RegistrationHandle>>,
}

impl DemoApp {
  fn new(dom_type: DomType) -> Self {
    Self {
      dom_type,
      handles: Mutex::new(HashMap::new()),
    }
  }
}

#[async_trait]
impl MicroAppModule for DemoApp {
  async fn init(&self, host: HostContext) -> Result<InitOutcome, InitError> {
    if !host.config.is_null() && !host.config.is_object() {
      return Err(InitError::invalid_config("config must be an object"));
    }

    let handle = host.register_reducer.register(Arc::new(reducer_fn(
      json!({ "navigations": 0 }),
      |state, action| {
        if action.is("router/locationChanged") {
          json!({ "navigations": state["navigations"].as_u64().unwrap_or(0) + 1 })
        } else {
          state.clone()
        }
      },
    )));
    self
      .handles
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .insert(host.html_tag.clone(), handle);

    Ok(InitOutcome {
      dom_type: self.dom_type,
    })
  }

  fn create_element(&self, html_tag: &str) -> Arc<dyn MicroAppElement> {
    Arc::new(DemoElement {
      html_tag: html_tag.to_string(),
      handle: self
        .handles
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .get(html_tag)
        .cloned(),
      context: Mutex::new(None),
    })
  }
}

struct DemoElement {
  html_tag: String,
  handle: Option<RegistrationHandle>,
  context: Mutex<Option<MountContext>>,
}

impl MicroAppElement for DemoElement {
  fn update(&self, context: &MountContext) {
    *self.context.lock().unwrap_or_else(|e| e.into_inner()) = Some(context.clone());
  }

  fn render(&self) -> String {
    let context = self.context.lock().unwrap_or_else(|e| e.into_inner());
    let path = context
      .as_ref()
      .and_then(|c| c.routing.as_ref())
      .map(|r| r.location.to_string())
      .unwrap_or_default();
    let navigations = self
      .handle
      .as_ref()
      .map(|h| h.select_micro_app_state()["navigations"].clone())
      .unwrap_or_default();
    format!(
      "<{tag} data-path=\"{path}\" data-navigations=\"{navigations}\"></{tag}>",
      tag = self.html_tag,
    )
  }
}
