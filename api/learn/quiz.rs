use hyper::{HeaderMap, Method, StatusCode, Uri};
use vercel_runtime::{run, service_fn, Error, Request, Response, ResponseBody};

use senbo_dashboard::api_support::{
  error_response, get_query_param, is_authorized, json_response, method_not_allowed, unauthorized,
};
use senbo_dashboard::app_state::PasswordGate;
use senbo_dashboard::config::SheetsConfig;
use senbo_dashboard::providers::sheets::{fetch_view, ContentView};
use senbo_dashboard::quiz::build_quiz;

const DEFAULT_ROUNDS: usize = 10;
const MAX_ROUNDS: usize = 50;

fn parse_rounds(uri: &Uri) -> usize {
  get_query_param(uri, "rounds")
    .and_then(|v| v.trim().parse::<usize>().ok())
    .unwrap_or(DEFAULT_ROUNDS)
    .clamp(1, MAX_ROUNDS)
}

fn parse_seed(uri: &Uri) -> u64 {
  get_query_param(uri, "seed")
    .and_then(|v| v.trim().parse::<u64>().ok())
    .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64)
}

async fn handle_quiz(method: &Method, headers: &HeaderMap, uri: &Uri) -> Result<Response<ResponseBody>, Error> {
  if method != Method::GET {
    return method_not_allowed();
  }

  if !is_authorized(&PasswordGate::from_env(), headers) {
    return unauthorized();
  }

  let view = match ContentView::from_key(&get_query_param(uri, "view").unwrap_or_default()) {
    Ok(view) => view,
    Err(err) => return error_response(&err),
  };

  let cfg = match SheetsConfig::from_env() {
    Ok(cfg) => cfg,
    Err(err) => return error_response(&err),
  };

  let items = match fetch_view(&cfg, view).await {
    Ok(items) => items,
    Err(err) => return error_response(&err),
  };

  let seed = parse_seed(uri);
  let questions: Vec<serde_json::Value> = build_quiz(&items, parse_rounds(uri), seed)
    .into_iter()
    .map(|q| serde_json::json!({"prompt": q.prompt(), "question": q}))
    .collect();

  json_response(
    StatusCode::OK,
    serde_json::json!({"ok": true, "seed": seed, "questions": questions}),
  )
}

async fn handler(req: Request) -> Result<Response<ResponseBody>, Error> {
  handle_quiz(req.method(), req.headers(), req.uri()).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  run(service_fn(handler)).await
}
