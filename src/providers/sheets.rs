use std::collections::HashMap;

use serde_json::Value;

use crate::config::SheetsConfig;
use crate::content::{normalize_batch, ContentItem, ContentSource, SourceRecord};
use crate::error::DashboardError;
use crate::http_client::{encode_component, get_json};

/// Which dashboard view a fetch feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentView {
  /// Senbo and Senne long-form videos combined.
  Videos,
  Reels,
}

impl ContentView {
  pub fn from_key(key: &str) -> Result<Self, DashboardError> {
    match key.trim().to_ascii_lowercase().as_str() {
      "" | "videos" => Ok(Self::Videos),
      "reels" => Ok(Self::Reels),
      other => Err(DashboardError::BadRequest(format!("unknown view: {other}"))),
    }
  }
}

pub fn values_url(cfg: &SheetsConfig, sheet_id: &str, range: &str) -> String {
  format!(
    "{}v4/spreadsheets/{}/values/{}?key={}&valueRenderOption=FORMATTED_VALUE",
    cfg.base_url,
    encode_component(sheet_id),
    encode_component(range),
    encode_component(&cfg.api_key),
  )
}

fn cell_to_string(v: &Value) -> String {
  match v {
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
  }
}

/// Extracts the `values` grid from a Sheets v4 response. A sheet with no
/// data has no `values` key at all.
pub fn parse_values(json: &Value) -> Vec<Vec<String>> {
  json
    .get("values")
    .and_then(|v| v.as_array())
    .map(|rows| {
      rows
        .iter()
        .map(|row| {
          row
            .as_array()
            .map(|cells| cells.iter().map(cell_to_string).collect())
            .unwrap_or_default()
        })
        .collect()
    })
    .unwrap_or_default()
}

pub async fn fetch_sheet_values(
  cfg: &SheetsConfig,
  sheet_id: &str,
  range: &str,
) -> Result<Vec<Vec<String>>, DashboardError> {
  let json = get_json(&values_url(cfg, sheet_id, range)).await?;
  let rows = parse_values(&json);
  tracing::info!(sheet_id, range, rows = rows.len(), "fetched sheet values");
  Ok(rows)
}

/// Turns a grid into row maps keyed by the lower-cased header row. Rows
/// shorter than the header are padded with empty cells; fully empty rows are
/// dropped.
pub fn rows_to_maps(grid: &[Vec<String>]) -> Vec<HashMap<String, String>> {
  let Some((header, rows)) = grid.split_first() else {
    return Vec::new();
  };
  let keys: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

  rows
    .iter()
    .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
    .map(|row| {
      keys
        .iter()
        .enumerate()
        .filter(|(_, k)| !k.is_empty())
        .map(|(idx, k)| (k.clone(), row.get(idx).cloned().unwrap_or_default()))
        .collect()
    })
    .collect()
}

pub fn grid_to_records(source: ContentSource, grid: &[Vec<String>]) -> Vec<SourceRecord> {
  rows_to_maps(grid)
    .iter()
    .map(|row| SourceRecord::from_row(source, row))
    .collect()
}

async fn fetch_records(
  cfg: &SheetsConfig,
  source: ContentSource,
  sheet_id: &str,
  range: &str,
) -> Result<Vec<SourceRecord>, DashboardError> {
  let grid = fetch_sheet_values(cfg, sheet_id, range).await?;
  Ok(grid_to_records(source, &grid))
}

/// Fetches and normalises every item a view shows.
pub async fn fetch_view(cfg: &SheetsConfig, view: ContentView) -> Result<Vec<ContentItem>, DashboardError> {
  let records = match view {
    ContentView::Videos => {
      let (senbo, senne) = tokio::join!(
        fetch_records(cfg, ContentSource::Senbo, &cfg.senbo_sheet_id, &cfg.videos_range),
        fetch_records(cfg, ContentSource::Senne, &cfg.senne_sheet_id, &cfg.videos_range),
      );
      let mut all = senbo?;
      all.extend(senne?);
      all
    }
    ContentView::Reels => fetch_records(cfg, ContentSource::Reels, &cfg.reels_sheet_id, &cfg.reels_range).await?,
  };

  Ok(normalize_batch(&records))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http_client::test_server::serve_one;
  use hyper::StatusCode;
  use tokio::net::TcpListener;

  fn cfg(base_url: &str) -> SheetsConfig {
    SheetsConfig {
      api_key: "k3y".to_string(),
      base_url: base_url.to_string(),
      senbo_sheet_id: "senbo-sheet".to_string(),
      senne_sheet_id: "senne-sheet".to_string(),
      reels_sheet_id: "reels-sheet".to_string(),
      videos_range: "Videos!A1:Z".to_string(),
      reels_range: "Reels!A1:Z".to_string(),
    }
  }

  fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows
      .iter()
      .map(|r| r.iter().map(|c| c.to_string()).collect())
      .collect()
  }

  #[test]
  fn builds_values_url() {
    let url = values_url(&cfg("https://sheets.googleapis.com/"), "abc", "Reels!A1:Z");
    assert_eq!(
      url,
      "https://sheets.googleapis.com/v4/spreadsheets/abc/values/Reels%21A1%3AZ?key=k3y&valueRenderOption=FORMATTED_VALUE"
    );
  }

  #[test]
  fn parse_values_handles_missing_and_mixed_cells() {
    let json = serde_json::json!({"range": "A1:B2", "values": [["Title", "Views"], ["A", 12]]});
    assert_eq!(parse_values(&json), grid(&[&["Title", "Views"], &["A", "12"]]));
    assert!(parse_values(&serde_json::json!({"range": "A1:B2"})).is_empty());
  }

  #[test]
  fn rows_to_maps_pads_short_rows_and_skips_blank_ones() {
    let g = grid(&[&["Title", " Views ", ""], &["A"], &["", ""], &["B", "7", "ignored"]]);
    let maps = rows_to_maps(&g);
    assert_eq!(maps.len(), 2);
    assert_eq!(maps[0]["views"], "");
    assert_eq!(maps[1]["views"], "7");
    assert!(!maps[1].contains_key(""));
  }

  #[test]
  fn grid_to_records_normalises_through_content() {
    let g = grid(&[
      &["Reel ID", "Caption", "Date", "Views"],
      &["r1", "Eerste", "2025-01-01 10:00", "1.500"],
      &["r2", "Tweede", "02/01/2025, 11:00", "300"],
    ]);
    let items = normalize_batch(&grid_to_records(ContentSource::Reels, &g));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].identity, "r1");
    assert_eq!(items[0].views, 1500.0);
    assert_eq!(items[1].title, "Tweede");
  }

  #[test]
  fn view_keys() {
    assert_eq!(ContentView::from_key("").unwrap(), ContentView::Videos);
    assert_eq!(ContentView::from_key("Reels").unwrap(), ContentView::Reels);
    assert!(ContentView::from_key("shorts").is_err());
  }

  #[tokio::test]
  async fn fetches_values_from_mock_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/", addr);

    let task = tokio::spawn(serve_one(
      listener,
      StatusCode::OK,
      r#"{"range":"Reels!A1:Z","majorDimension":"ROWS","values":[["Reel ID","Views"],["r1","42"]]}"#,
      |path| {
        assert!(path.starts_with("/v4/spreadsheets/reels-sheet/values/Reels%21A1%3AZ"));
        assert!(path.contains("key=k3y"));
      },
    ));

    let c = cfg(&base_url);
    let rows = fetch_sheet_values(&c, &c.reels_sheet_id, &c.reels_range).await.unwrap();
    assert_eq!(rows, grid(&[&["Reel ID", "Views"], &["r1", "42"]]));

    task.await.unwrap();
  }

  #[tokio::test]
  async fn upstream_errors_keep_status() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(serve_one(listener, StatusCode::NOT_FOUND, r#"{"error":{"code":404}}"#, |_| {}));

    let c = cfg(&format!("http://{}/", addr));
    let err = fetch_sheet_values(&c, "missing", "A1:B").await.unwrap_err();
    assert!(matches!(err, DashboardError::Upstream { status: Some(404), .. }));

    task.await.unwrap();
  }
}
