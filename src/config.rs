use crate::error::DashboardError;

pub const DEFAULT_WINDOW_RADIUS: usize = 5;
pub const DEFAULT_THRESHOLD: f64 = 2.0;
pub const MIN_THRESHOLD: f64 = 1.0;
pub const MAX_THRESHOLD: f64 = 100.0;

/// Shared by the reels view and the combined-videos view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierConfig {
  pub window_radius: usize,
  pub threshold: f64,
}

impl Default for OutlierConfig {
  fn default() -> Self {
    Self {
      window_radius: DEFAULT_WINDOW_RADIUS,
      threshold: DEFAULT_THRESHOLD,
    }
  }
}

/// Clamps a user-supplied threshold into the range the dashboard control
/// allows. The scorer itself accepts anything positive.
pub fn clamp_threshold(value: f64) -> f64 {
  if value.is_nan() {
    return DEFAULT_THRESHOLD;
  }
  value.clamp(MIN_THRESHOLD, MAX_THRESHOLD)
}

impl OutlierConfig {
  pub fn with_threshold(threshold: f64) -> Self {
    Self {
      threshold: clamp_threshold(threshold),
      ..Self::default()
    }
  }

  pub fn from_query(threshold: Option<&str>) -> Self {
    let parsed = threshold
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .and_then(|v| v.replace(',', ".").parse::<f64>().ok());
    match parsed {
      Some(t) => Self::with_threshold(t),
      None => Self::default(),
    }
  }
}

fn env_non_empty(key: &str) -> Option<String> {
  std::env::var(key)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn env_required(key: &str) -> Result<String, DashboardError> {
  env_non_empty(key).ok_or_else(|| DashboardError::NotConfigured(format!("missing {key}")))
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
  pub api_key: String,
  pub base_url: String,
  pub senbo_sheet_id: String,
  pub senne_sheet_id: String,
  pub reels_sheet_id: String,
  pub videos_range: String,
  pub reels_range: String,
}

impl SheetsConfig {
  pub fn from_env() -> Result<Self, DashboardError> {
    let mut base_url =
      env_non_empty("SHEETS_BASE_URL").unwrap_or_else(|| "https://sheets.googleapis.com/".to_string());
    if !base_url.ends_with('/') {
      base_url.push('/');
    }

    Ok(Self {
      api_key: env_required("GOOGLE_SHEETS_API_KEY")?,
      base_url,
      senbo_sheet_id: env_required("SHEET_ID_SENBO")?,
      senne_sheet_id: env_required("SHEET_ID_SENNE")?,
      reels_sheet_id: env_required("SHEET_ID_REELS")?,
      videos_range: env_non_empty("SHEET_RANGE_VIDEOS").unwrap_or_else(|| "Videos!A1:Z".to_string()),
      reels_range: env_non_empty("SHEET_RANGE_REELS").unwrap_or_else(|| "Reels!A1:Z".to_string()),
    })
  }
}

pub fn dashboard_password() -> Option<String> {
  env_non_empty("DASHBOARD_PASSWORD")
}

pub fn database_url() -> Option<String> {
  env_non_empty("TIDB_DATABASE_URL").or_else(|| env_non_empty("DATABASE_URL"))
}
