use hyper::{HeaderMap, Method, StatusCode, Uri};
use vercel_runtime::{run, service_fn, Error, Request, Response, ResponseBody};

use senbo_dashboard::api_support::{
  error_response, get_query_param, is_authorized, json_response, method_not_allowed, unauthorized,
};
use senbo_dashboard::app_state::PasswordGate;
use senbo_dashboard::error::DashboardError;
use senbo_dashboard::providers::oembed::fetch_thumbnail_url;

async fn handle_thumbnail(method: &Method, headers: &HeaderMap, uri: &Uri) -> Result<Response<ResponseBody>, Error> {
  if method != Method::GET {
    return method_not_allowed();
  }

  if !is_authorized(&PasswordGate::from_env(), headers) {
    return unauthorized();
  }

  let content_url = get_query_param(uri, "url").unwrap_or_default();
  let content_url = content_url.trim();
  if content_url.is_empty() {
    return error_response(&DashboardError::BadRequest("url is required".to_string()));
  }

  let thumbnail_url = fetch_thumbnail_url(content_url).await;
  json_response(
    StatusCode::OK,
    serde_json::json!({"ok": true, "thumbnail_url": thumbnail_url}),
  )
}

async fn handler(req: Request) -> Result<Response<ResponseBody>, Error> {
  handle_thumbnail(req.method(), req.headers(), req.uri()).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  run(service_fn(handler)).await
}
