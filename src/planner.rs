use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannerColumn {
  Ideas,
  Scripting,
  Filming,
  Editing,
  Posted,
}

impl PlannerColumn {
  pub const ALL: [PlannerColumn; 5] = [
    PlannerColumn::Ideas,
    PlannerColumn::Scripting,
    PlannerColumn::Filming,
    PlannerColumn::Editing,
    PlannerColumn::Posted,
  ];

  pub fn key(self) -> &'static str {
    match self {
      Self::Ideas => "ideas",
      Self::Scripting => "scripting",
      Self::Filming => "filming",
      Self::Editing => "editing",
      Self::Posted => "posted",
    }
  }

  pub fn from_key(key: &str) -> Result<Self, DashboardError> {
    Self::ALL
      .iter()
      .copied()
      .find(|c| c.key().eq_ignore_ascii_case(key.trim()))
      .ok_or_else(|| DashboardError::BadRequest(format!("unknown planner column: {key}")))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerCard {
  pub id: i64,
  pub title: String,
  pub notes: String,
  pub column: PlannerColumn,
  pub position: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// New position for one card after a move or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
  pub id: i64,
  pub column: PlannerColumn,
  pub position: i32,
}

fn column_ids(cards: &[PlannerCard], column: PlannerColumn) -> Vec<i64> {
  let mut in_column: Vec<&PlannerCard> = cards.iter().filter(|c| c.column == column).collect();
  in_column.sort_by_key(|c| (c.position, c.id));
  in_column.into_iter().map(|c| c.id).collect()
}

fn dense(ids: &[i64], column: PlannerColumn) -> Vec<PositionUpdate> {
  ids
    .iter()
    .enumerate()
    .map(|(idx, id)| PositionUpdate {
      id: *id,
      column,
      position: idx as i32,
    })
    .collect()
}

/// Computes the dense `0..n` positions of both affected columns after moving
/// `card_id` to `to_index` in `to_column`. `to_index` past the end appends.
pub fn plan_move(
  cards: &[PlannerCard],
  card_id: i64,
  to_column: PlannerColumn,
  to_index: usize,
) -> Result<Vec<PositionUpdate>, DashboardError> {
  let card = cards
    .iter()
    .find(|c| c.id == card_id)
    .ok_or_else(|| DashboardError::BadRequest(format!("unknown planner card: {card_id}")))?;
  let from_column = card.column;

  let mut source = column_ids(cards, from_column);
  source.retain(|id| *id != card_id);

  if from_column == to_column {
    let idx = to_index.min(source.len());
    source.insert(idx, card_id);
    return Ok(dense(&source, to_column));
  }

  let mut target = column_ids(cards, to_column);
  let idx = to_index.min(target.len());
  target.insert(idx, card_id);

  let mut out = dense(&source, from_column);
  out.extend(dense(&target, to_column));
  Ok(out)
}

/// Positions for the remaining cards of a column after `card_id` is removed.
pub fn plan_delete(cards: &[PlannerCard], card_id: i64) -> Vec<PositionUpdate> {
  let Some(card) = cards.iter().find(|c| c.id == card_id) else {
    return Vec::new();
  };
  let mut ids = column_ids(cards, card.column);
  ids.retain(|id| *id != card_id);
  dense(&ids, card.column)
}

pub fn next_position(cards: &[PlannerCard], column: PlannerColumn) -> i32 {
  cards
    .iter()
    .filter(|c| c.column == column)
    .map(|c| c.position + 1)
    .max()
    .unwrap_or(0)
}

/// Board order: by column, then position.
pub fn sort_board(cards: &mut [PlannerCard]) {
  cards.sort_by_key(|c| (c.column, c.position, c.id));
}
