use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::HostError;

/// An authenticated user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub user: String,
  pub access_token: String,
}

impl Session {
  pub fn new(user: impl Into<String>, access_token: impl Into<String>) -> Self {
    Self {
      user: user.into(),
      access_token: access_token.into(),
    }
  }
}

/// Where the host keeps the session between runs.
#[async_trait]
pub trait SessionStore: Send + Sync {
  /// The persisted session, or `None` if nobody is signed in.
  async fn load(&self) -> Result<Option<Session>, HostError>;

  async fn save(&self, session: &Session) -> Result<(), HostError>;

  /// Forget the session. Clearing an empty store is not an error.
  async fn clear(&self) -> Result<(), HostError>;
}

/// Session persisted as a JSON file.
pub struct FsSessionStore {
  path: PathBuf,
}

impl FsSessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl SessionStore for FsSessionStore {
  async fn load(&self) -> Result<Option<Session>, HostError> {
    let content = match fs::read_to_string(&self.path).await {
      Ok(content) => content,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let session: Session = serde_json::from_str(&content)?;
    Ok(Some(session))
  }

  async fn save(&self, session: &Session) -> Result<(), HostError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(session)?;
    fs::write(&self.path, content).await?;
    Ok(())
  }

  async fn clear(&self) -> Result<(), HostError> {
    match fs::remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

/// Session kept in memory only.
#[derive(Default)]
pub struct MemorySessionStore {
  session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store that already holds `session`.
  pub fn with_session(session: Session) -> Self {
    Self {
      session: Mutex::new(Some(session)),
    }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
    self.session.lock().unwrap_or_else(|e| e.into_inner())
  }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
  async fn load(&self) -> Result<Option<Session>, HostError> {
    Ok(self.lock().clone())
  }

  async fn save(&self, session: &Session) -> Result<(), HostError> {
    *self.lock() = Some(session.clone());
    Ok(())
  }

  async fn clear(&self) -> Result<(), HostError> {
    *self.lock() = None;
    Ok(())
  }
}
