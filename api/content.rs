use chrono::{NaiveDateTime, Timelike};
use hyper::{HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use vercel_runtime::{run, service_fn, Error, Request, Response, ResponseBody};

use senbo_dashboard::api_support::{
  error_response, get_query_param, is_authorized, json_response, method_not_allowed, unauthorized,
};
use senbo_dashboard::app_state::PasswordGate;
use senbo_dashboard::config::{OutlierConfig, SheetsConfig};
use senbo_dashboard::content::ContentSource;
use senbo_dashboard::error::DashboardError;
use senbo_dashboard::listing::{ItemFilter, SortDirection, SortKey};
use senbo_dashboard::providers::sheets::{fetch_view, ContentView};
use senbo_dashboard::published_at::try_parse_published_at;
use senbo_dashboard::view::{build_view, ViewQuery, ViewResult};

#[derive(Serialize)]
struct ContentResponse {
  ok: bool,
  #[serde(flatten)]
  view: ViewResult,
}

fn view_response(view: ViewResult) -> Result<Response<ResponseBody>, Error> {
  let body = serde_json::to_value(ContentResponse { ok: true, view })?;
  json_response(StatusCode::OK, body)
}

fn parse_bool(value: Option<String>) -> bool {
  matches!(
    value.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref(),
    Some("1") | Some("true") | Some("yes")
  )
}

fn parse_bound(uri: &Uri, key: &str, end_of_day: bool) -> Result<Option<NaiveDateTime>, DashboardError> {
  let Some(raw) = get_query_param(uri, key).filter(|v| !v.trim().is_empty()) else {
    return Ok(None);
  };
  let dt = try_parse_published_at(&raw)
    .ok_or_else(|| DashboardError::BadRequest(format!("{key} is not a date: {raw}")))?;
  // A bare date as upper bound includes that whole day.
  if end_of_day && dt.num_seconds_from_midnight() == 0 {
    return Ok(dt.date().and_hms_opt(23, 59, 59));
  }
  Ok(Some(dt))
}

fn parse_view_query(uri: &Uri) -> Result<(ContentView, ViewQuery), DashboardError> {
  let view = ContentView::from_key(&get_query_param(uri, "view").unwrap_or_default())?;

  let source = match get_query_param(uri, "source").filter(|v| !v.trim().is_empty() && v != "all") {
    Some(key) => Some(
      ContentSource::from_key(&key).ok_or_else(|| DashboardError::BadRequest(format!("unknown source: {key}")))?,
    ),
    None => None,
  };

  let sort = match get_query_param(uri, "sort").filter(|v| !v.trim().is_empty()) {
    Some(key) => {
      let dir = SortDirection::from_key(&get_query_param(uri, "dir").unwrap_or_default());
      Some((SortKey::from_key(&key)?, dir))
    }
    None => None,
  };

  let query = ViewQuery {
    filter: ItemFilter {
      title_query: get_query_param(uri, "q"),
      from: parse_bound(uri, "from", false)?,
      to: parse_bound(uri, "to", true)?,
      source,
    },
    sort,
    outliers_only: parse_bool(get_query_param(uri, "outliers_only")),
    hide_revenue: parse_bool(get_query_param(uri, "hide_revenue")),
    outlier: OutlierConfig::from_query(get_query_param(uri, "threshold").as_deref()),
  };

  Ok((view, query))
}

async fn handle_content(method: &Method, headers: &HeaderMap, uri: &Uri) -> Result<Response<ResponseBody>, Error> {
  if method != Method::GET {
    return method_not_allowed();
  }

  if !is_authorized(&PasswordGate::from_env(), headers) {
    return unauthorized();
  }

  let (view, query) = match parse_view_query(uri) {
    Ok(parsed) => parsed,
    Err(err) => return error_response(&err),
  };

  let cfg = match SheetsConfig::from_env() {
    Ok(cfg) => cfg,
    Err(err) => return error_response(&err),
  };

  let items = match fetch_view(&cfg, view).await {
    Ok(items) => items,
    Err(err) => {
      tracing::warn!(error = %err, ?view, "sheet fetch failed");
      return error_response(&err);
    }
  };

  let fetched = items.len();
  let result = build_view(items, &query);
  tracing::info!(
    ?view,
    fetched,
    shown = result.items.len(),
    outliers = result.outlier_count,
    threshold = result.threshold,
    "content view built"
  );

  view_response(result)
}

async fn handler(req: Request) -> Result<Response<ResponseBody>, Error> {
  handle_content(req.method(), req.headers(), req.uri()).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  run(service_fn(handler)).await
}
