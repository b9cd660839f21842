use http_body_util::BodyExt;
use hyper::{Method, StatusCode};
use serde::Deserialize;
use vercel_runtime::{run, service_fn, Error, Request, Response, ResponseBody};

use senbo_dashboard::api_support::{error_response, json_response, method_not_allowed};
use senbo_dashboard::app_state::PasswordGate;
use senbo_dashboard::error::DashboardError;

#[derive(Deserialize)]
struct VerifyRequest {
  #[serde(default)]
  password: String,
}

async fn handle_verify(method: &Method, gate: &PasswordGate, body: &[u8]) -> Result<Response<ResponseBody>, Error> {
  if method != Method::POST {
    return method_not_allowed();
  }

  if !gate.is_configured() {
    return error_response(&DashboardError::NotConfigured("Missing DASHBOARD_PASSWORD".to_string()));
  }

  let parsed: VerifyRequest = match serde_json::from_slice(body) {
    Ok(v) => v,
    Err(e) => return error_response(&DashboardError::from(e)),
  };

  let ok = gate.verify(&parsed.password);
  if !ok {
    tracing::info!("dashboard password rejected");
  }

  let status = if ok { StatusCode::OK } else { StatusCode::UNAUTHORIZED };
  json_response(status, serde_json::json!({"ok": ok}))
}

async fn handler(req: Request) -> Result<Response<ResponseBody>, Error> {
  let method = req.method().clone();
  let bytes = req.into_body().collect().await?.to_bytes();
  handle_verify(&method, &PasswordGate::from_env(), &bytes).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  run(service_fn(handler)).await
}
