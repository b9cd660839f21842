//! Dashboard UI state that survives reloads.
//!
//! Lifecycle: [`AppStateHandle::open`] loads the last saved state from a
//! [`StateStore`] (falling back to defaults when nothing usable is stored)
//! and every setter writes the full state back before returning.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::{clamp_threshold, DEFAULT_THRESHOLD};
use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
  pub unlocked: bool,
  pub theme: Theme,
  pub hide_revenue: bool,
  pub outlier_threshold: f64,
}

impl Default for AppState {
  fn default() -> Self {
    Self {
      unlocked: false,
      theme: Theme::Light,
      hide_revenue: false,
      outlier_threshold: DEFAULT_THRESHOLD,
    }
  }
}

pub trait StateStore: Send + Sync {
  fn load(&self) -> Result<Option<AppState>, DashboardError>;
  fn save(&self, state: &AppState) -> Result<(), DashboardError>;
}

#[derive(Debug)]
pub struct JsonFileStore {
  path: PathBuf,
}

impl JsonFileStore {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_path_buf(),
    }
  }
}

impl StateStore for JsonFileStore {
  fn load(&self) -> Result<Option<AppState>, DashboardError> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(DashboardError::Storage(e.to_string())),
    };
    Ok(Some(serde_json::from_str(&raw)?))
  }

  fn save(&self, state: &AppState) -> Result<(), DashboardError> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(&self.path, json).map_err(|e| DashboardError::Storage(e.to_string()))
  }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Option<AppState>>,
}

impl StateStore for MemoryStore {
  fn load(&self) -> Result<Option<AppState>, DashboardError> {
    let guard = self
      .inner
      .lock()
      .map_err(|e| DashboardError::Storage(e.to_string()))?;
    Ok(guard.clone())
  }

  fn save(&self, state: &AppState) -> Result<(), DashboardError> {
    let mut guard = self
      .inner
      .lock()
      .map_err(|e| DashboardError::Storage(e.to_string()))?;
    *guard = Some(state.clone());
    Ok(())
  }
}

pub struct AppStateHandle<S: StateStore> {
  store: S,
  state: AppState,
}

impl<S: StateStore> AppStateHandle<S> {
  pub fn open(store: S) -> Self {
    let state = match store.load() {
      Ok(Some(mut state)) => {
        state.outlier_threshold = clamp_threshold(state.outlier_threshold);
        state
      }
      Ok(None) => AppState::default(),
      Err(err) => {
        tracing::warn!(error = %err, "stored dashboard state unreadable; using defaults");
        AppState::default()
      }
    };
    Self { store, state }
  }

  pub fn state(&self) -> &AppState {
    &self.state
  }

  fn update(&mut self, f: impl FnOnce(&mut AppState)) -> Result<(), DashboardError> {
    f(&mut self.state);
    self.store.save(&self.state)
  }

  /// Unlocks the dashboard when `candidate` matches. Returns whether it did.
  pub fn unlock(&mut self, gate: &PasswordGate, candidate: &str) -> Result<bool, DashboardError> {
    if !gate.verify(candidate) {
      return Ok(false);
    }
    self.update(|s| s.unlocked = true)?;
    Ok(true)
  }

  pub fn lock(&mut self) -> Result<(), DashboardError> {
    self.update(|s| s.unlocked = false)
  }

  pub fn set_theme(&mut self, theme: Theme) -> Result<(), DashboardError> {
    self.update(|s| s.theme = theme)
  }

  pub fn toggle_theme(&mut self) -> Result<Theme, DashboardError> {
    let next = match self.state.theme {
      Theme::Light => Theme::Dark,
      Theme::Dark => Theme::Light,
    };
    self.set_theme(next)?;
    Ok(next)
  }

  pub fn set_hide_revenue(&mut self, hide: bool) -> Result<(), DashboardError> {
    self.update(|s| s.hide_revenue = hide)
  }

  /// Stores the clamped threshold and returns it.
  pub fn set_outlier_threshold(&mut self, threshold: f64) -> Result<f64, DashboardError> {
    let clamped = clamp_threshold(threshold);
    self.update(|s| s.outlier_threshold = clamped)?;
    Ok(clamped)
  }

  pub fn into_store(self) -> S {
    self.store
  }
}

/// Shared-password check. With no password configured the gate stays shut.
#[derive(Debug, Clone)]
pub struct PasswordGate {
  expected: Option<String>,
}

impl PasswordGate {
  pub fn new(expected: Option<String>) -> Self {
    Self {
      expected: expected.filter(|p| !p.is_empty()),
    }
  }

  pub fn from_env() -> Self {
    Self::new(crate::config::dashboard_password())
  }

  pub fn is_configured(&self) -> bool {
    self.expected.is_some()
  }

  pub fn verify(&self, candidate: &str) -> bool {
    match self.expected.as_deref() {
      Some(expected) => constant_time_eq(expected.as_bytes(), candidate.as_bytes()),
      None => false,
    }
  }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
