//! Helpers shared by the functions under `api/`.

use hyper::{HeaderMap, StatusCode, Uri};
use vercel_runtime::{Error, Response, ResponseBody};

use crate::app_state::PasswordGate;
use crate::error::DashboardError;

pub const PASSWORD_HEADER: &str = "x-dashboard-password";

pub fn json_response(status: StatusCode, value: serde_json::Value) -> Result<Response<ResponseBody>, Error> {
  Ok(
    Response::builder()
      .status(status)
      .header("content-type", "application/json; charset=utf-8")
      .header("cache-control", "no-store")
      .body(ResponseBody::from(value))?,
  )
}

pub fn status_for(err: &DashboardError) -> StatusCode {
  match err {
    DashboardError::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
    DashboardError::BadRequest(_) | DashboardError::InvalidJson(_) => StatusCode::BAD_REQUEST,
    DashboardError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    DashboardError::Database(_) | DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

pub fn error_response(err: &DashboardError) -> Result<Response<ResponseBody>, Error> {
  json_response(
    status_for(err),
    serde_json::json!({"ok": false, "error": err.code(), "message": err.to_string()}),
  )
}

pub fn method_not_allowed() -> Result<Response<ResponseBody>, Error> {
  json_response(
    StatusCode::METHOD_NOT_ALLOWED,
    serde_json::json!({"ok": false, "error": "method_not_allowed"}),
  )
}

pub fn unauthorized() -> Result<Response<ResponseBody>, Error> {
  json_response(
    StatusCode::UNAUTHORIZED,
    serde_json::json!({"ok": false, "error": "unauthorized"}),
  )
}

/// True when the request carries the configured dashboard password.
pub fn is_authorized(gate: &PasswordGate, headers: &HeaderMap) -> bool {
  let provided = headers
    .get(PASSWORD_HEADER)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("");
  gate.verify(provided)
}

fn decode_hex_digit(b: u8) -> Option<u8> {
  match b {
    b'0'..=b'9' => Some(b - b'0'),
    b'a'..=b'f' => Some(b - b'a' + 10),
    b'A'..=b'F' => Some(b - b'A' + 10),
    _ => None,
  }
}

pub fn percent_decode(input: &str) -> Option<String> {
  let bytes = input.as_bytes();
  let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
  let mut i = 0;
  while i < bytes.len() {
    match bytes[i] {
      b'%' if i + 2 < bytes.len() => {
        let hi = decode_hex_digit(bytes[i + 1])?;
        let lo = decode_hex_digit(bytes[i + 2])?;
        out.push((hi << 4) | lo);
        i += 3;
      }
      b'+' => {
        out.push(b' ');
        i += 1;
      }
      b => {
        out.push(b);
        i += 1;
      }
    }
  }
  String::from_utf8(out).ok()
}

pub fn get_query_param(uri: &Uri, key: &str) -> Option<String> {
  let query = uri.query()?;
  for part in query.split('&') {
    let mut it = part.splitn(2, '=');
    let k = it.next().unwrap_or("");
    if k != key {
      continue;
    }
    let v = it.next().unwrap_or("");
    return percent_decode(v).or_else(|| Some(v.to_string()));
  }
  None
}
