use http_body_util::BodyExt;
use hyper::{HeaderMap, Method, StatusCode, Uri};
use serde::Deserialize;
use vercel_runtime::{run, service_fn, Error, Request, Response, ResponseBody};

use senbo_dashboard::api_support::{
  error_response, get_query_param, is_authorized, json_response, method_not_allowed, unauthorized,
};
use senbo_dashboard::app_state::PasswordGate;
use senbo_dashboard::db::{
  create_planner_card, delete_planner_card, get_pool, list_planner_cards, move_planner_card,
  update_planner_card_text,
};
use senbo_dashboard::error::DashboardError;
use senbo_dashboard::planner::PlannerColumn;

#[derive(Debug, Deserialize)]
struct CreateBody {
  title: String,
  #[serde(default)]
  notes: String,
  #[serde(default)]
  column: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PatchBody {
  id: i64,
  #[serde(default)]
  title: Option<String>,
  #[serde(default)]
  notes: Option<String>,
  #[serde(default)]
  column: Option<String>,
  #[serde(default)]
  index: Option<usize>,
}

#[derive(Debug, PartialEq)]
enum PlannerAction {
  List,
  Create { title: String, notes: String, column: PlannerColumn },
  Edit { id: i64, title: Option<String>, notes: Option<String> },
  Move { id: i64, column: PlannerColumn, index: usize },
  Delete { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlannerMethod {
  Get,
  Post,
  Patch,
  Delete,
}

impl PlannerMethod {
  fn from_method(method: &Method) -> Option<Self> {
    if method == Method::GET {
      Some(Self::Get)
    } else if method == Method::POST {
      Some(Self::Post)
    } else if method == Method::PATCH {
      Some(Self::Patch)
    } else if method == Method::DELETE {
      Some(Self::Delete)
    } else {
      None
    }
  }
}

fn parse_action(method: PlannerMethod, uri: &Uri, body: &[u8]) -> Result<PlannerAction, DashboardError> {
  match method {
    PlannerMethod::Get => Ok(PlannerAction::List),
    PlannerMethod::Post => {
      let b: CreateBody = serde_json::from_slice(body)?;
      let title = b.title.trim().to_string();
      if title.is_empty() {
        return Err(DashboardError::BadRequest("title is required".to_string()));
      }
      let column = match b.column.as_deref() {
        Some(key) => PlannerColumn::from_key(key)?,
        None => PlannerColumn::Ideas,
      };
      Ok(PlannerAction::Create {
        title,
        notes: b.notes,
        column,
      })
    }
    PlannerMethod::Patch => {
      let b: PatchBody = serde_json::from_slice(body)?;
      let edits_text = b.title.is_some() || b.notes.is_some();
      if let Some(key) = b.column.as_deref() {
        if edits_text {
          return Err(DashboardError::BadRequest(
            "move and edit must be sent as separate requests".to_string(),
          ));
        }
        return Ok(PlannerAction::Move {
          id: b.id,
          column: PlannerColumn::from_key(key)?,
          index: b.index.unwrap_or(usize::MAX),
        });
      }
      if !edits_text {
        return Err(DashboardError::BadRequest("nothing to update".to_string()));
      }
      Ok(PlannerAction::Edit {
        id: b.id,
        title: b.title,
        notes: b.notes,
      })
    }
    PlannerMethod::Delete => {
      let id = get_query_param(uri, "id")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| DashboardError::BadRequest("id is required".to_string()))?;
      Ok(PlannerAction::Delete { id })
    }
  }
}

async fn execute(action: PlannerAction) -> Result<serde_json::Value, DashboardError> {
  let pool = get_pool().await?;
  match action {
    PlannerAction::List => {
      let cards = list_planner_cards(pool).await?;
      Ok(serde_json::json!({"ok": true, "cards": cards}))
    }
    PlannerAction::Create { title, notes, column } => {
      let card = create_planner_card(pool, &title, &notes, column).await?;
      tracing::info!(id = card.id, column = column.key(), "planner card created");
      Ok(serde_json::json!({"ok": true, "card": card}))
    }
    PlannerAction::Edit { id, title, notes } => {
      let card = update_planner_card_text(pool, id, title.as_deref(), notes.as_deref())
        .await?
        .ok_or_else(|| DashboardError::BadRequest(format!("unknown planner card: {id}")))?;
      Ok(serde_json::json!({"ok": true, "card": card}))
    }
    PlannerAction::Move { id, column, index } => {
      let cards = move_planner_card(pool, id, column, index).await?;
      tracing::info!(id, column = column.key(), index, "planner card moved");
      Ok(serde_json::json!({"ok": true, "cards": cards}))
    }
    PlannerAction::Delete { id } => {
      let deleted = delete_planner_card(pool, id).await?;
      Ok(serde_json::json!({"ok": true, "deleted": deleted}))
    }
  }
}

async fn handle_cards(
  method: &Method,
  headers: &HeaderMap,
  uri: &Uri,
  body: &[u8],
) -> Result<Response<ResponseBody>, Error> {
  let Some(planner_method) = PlannerMethod::from_method(method) else {
    return method_not_allowed();
  };

  if !is_authorized(&PasswordGate::from_env(), headers) {
    return unauthorized();
  }

  let action = match parse_action(planner_method, uri, body) {
    Ok(action) => action,
    Err(err) => return error_response(&err),
  };

  match execute(action).await {
    Ok(value) => json_response(StatusCode::OK, value),
    Err(err) => {
      tracing::warn!(error = %err, "planner request failed");
      error_response(&err)
    }
  }
}

async fn handler(req: Request) -> Result<Response<ResponseBody>, Error> {
  let method = req.method().clone();
  let headers = req.headers().clone();
  let uri = req.uri().clone();
  let bytes = req.into_body().collect().await?.to_bytes();
  handle_cards(&method, &headers, &uri, &bytes).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
  senbo_dashboard::telemetry::init();
  run(service_fn(handler)).await
}
