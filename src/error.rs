use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
  #[error("not configured: {0}")]
  NotConfigured(String),

  #[error("upstream error (status={status:?}): {message}")]
  Upstream { status: Option<u16>, message: String },

  #[error("invalid json: {0}")]
  InvalidJson(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("database error: {0}")]
  Database(String),

  #[error("storage error: {0}")]
  Storage(String),
}

impl DashboardError {
  pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
    Self::Upstream {
      status,
      message: message.into(),
    }
  }

  /// Stable machine-readable code used in JSON error bodies.
  pub fn code(&self) -> &'static str {
    match self {
      Self::NotConfigured(_) => "not_configured",
      Self::Upstream { .. } => "upstream_error",
      Self::InvalidJson(_) => "invalid_json",
      Self::BadRequest(_) => "bad_request",
      Self::Database(_) => "database_error",
      Self::Storage(_) => "storage_error",
    }
  }
}

impl From<sqlx::Error> for DashboardError {
  fn from(e: sqlx::Error) -> Self {
    Self::Database(e.to_string())
  }
}

impl From<serde_json::Error> for DashboardError {
  fn from(e: serde_json::Error) -> Self {
    Self::InvalidJson(e.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn codes_are_stable() {
    assert_eq!(DashboardError::NotConfigured("x".into()).code(), "not_configured");
    assert_eq!(DashboardError::upstream(Some(403), "nope").code(), "upstream_error");
  }

  #[test]
  fn upstream_display_includes_status() {
    let err = DashboardError::upstream(Some(404), "sheet not found");
    assert_eq!(err.to_string(), "upstream error (status=Some(404)): sheet not found");
  }
}
