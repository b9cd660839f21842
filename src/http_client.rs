use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{ACCEPT, USER_AGENT};
use hyper::{Method, Request, StatusCode};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use serde_json::Value;

use crate::error::DashboardError;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

fn build_client() -> Result<HttpsClient, DashboardError> {
  let connector = hyper_rustls::HttpsConnectorBuilder::new()
    .with_native_roots()
    .map_err(|e| DashboardError::upstream(None, e.to_string()))?
    .https_or_http()
    .enable_http1()
    .build();

  Ok(Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector))
}

/// GETs `url` and decodes a JSON body. Anything but 200 is an
/// [`DashboardError::Upstream`] carrying the status and body text.
pub async fn get_json(url: &str) -> Result<Value, DashboardError> {
  let client = build_client()?;

  let req = Request::builder()
    .method(Method::GET)
    .uri(url)
    .header(ACCEPT, "application/json")
    .header(USER_AGENT, "senbo-dashboard-rust")
    .body(Empty::<Bytes>::new())
    .map_err(|e| DashboardError::upstream(None, e.to_string()))?;

  // Keep requests bounded in serverless.
  let resp = tokio::time::timeout(REQUEST_TIMEOUT, client.request(req))
    .await
    .map_err(|_| DashboardError::upstream(None, format!("timed out after {:?}", REQUEST_TIMEOUT)))?
    .map_err(|e| DashboardError::upstream(None, e.to_string()))?;

  let status = resp.status();
  let body_bytes = resp
    .into_body()
    .collect()
    .await
    .map_err(|e| DashboardError::upstream(Some(status.as_u16()), e.to_string()))?
    .to_bytes();

  if status != StatusCode::OK {
    let msg = String::from_utf8_lossy(&body_bytes).to_string();
    return Err(DashboardError::upstream(Some(status.as_u16()), msg));
  }

  serde_json::from_slice::<Value>(&body_bytes)
    .map_err(|e| DashboardError::InvalidJson(format!("invalid json response: {e}")))
}

/// Minimal query-string encoding for values placed into upstream URLs.
pub fn encode_component(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for b in value.bytes() {
    match b {
      b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
      _ => out.push_str(&format!("%{:02X}", b)),
    }
  }
  out
}
