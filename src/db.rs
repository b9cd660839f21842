use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use tokio::sync::OnceCell;

use crate::error::DashboardError;
use crate::planner::{next_position, plan_delete, plan_move, PlannerCard, PlannerColumn, PositionUpdate};

static POOL: OnceCell<MySqlPool> = OnceCell::const_new();

type CardRow = (i64, String, String, String, i32, DateTime<Utc>, DateTime<Utc>);

async fn ensure_schema(pool: &MySqlPool) -> Result<(), DashboardError> {
  sqlx::query(
    r#"
      CREATE TABLE IF NOT EXISTS planner_cards (
        id BIGINT PRIMARY KEY AUTO_INCREMENT,
        title VARCHAR(255) NOT NULL,
        notes TEXT NOT NULL,
        board_column VARCHAR(16) NOT NULL DEFAULT 'ideas',
        position INT NOT NULL DEFAULT 0,
        created_at TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3),
        updated_at TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3),
        KEY idx_planner_cards_column (board_column, position)
      );
    "#,
  )
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn get_pool() -> Result<&'static MySqlPool, DashboardError> {
  POOL
    .get_or_try_init(|| async {
      let url = crate::config::database_url()
        .ok_or_else(|| DashboardError::NotConfigured("Missing TIDB_DATABASE_URL (or DATABASE_URL)".to_string()))?;

      let pool = MySqlPoolOptions::new().max_connections(5).connect(&url).await?;

      ensure_schema(&pool).await?;
      Ok::<_, DashboardError>(pool)
    })
    .await
}

fn card_from_row(row: CardRow) -> Result<PlannerCard, DashboardError> {
  let (id, title, notes, column, position, created_at, updated_at) = row;
  Ok(PlannerCard {
    id,
    title,
    notes,
    column: PlannerColumn::from_key(&column)
      .map_err(|_| DashboardError::Database(format!("card {id} has unknown column {column}")))?,
    position,
    created_at,
    updated_at,
  })
}

pub async fn list_planner_cards(pool: &MySqlPool) -> Result<Vec<PlannerCard>, DashboardError> {
  let rows = sqlx::query_as::<_, CardRow>(
    r#"
      SELECT id, title, notes, board_column, position, created_at, updated_at
      FROM planner_cards
      ORDER BY board_column ASC, position ASC, id ASC;
    "#,
  )
  .fetch_all(pool)
  .await?;

  let mut cards = rows.into_iter().map(card_from_row).collect::<Result<Vec<_>, _>>()?;
  crate::planner::sort_board(&mut cards);
  Ok(cards)
}

async fn fetch_card(pool: &MySqlPool, id: i64) -> Result<Option<PlannerCard>, DashboardError> {
  let row = sqlx::query_as::<_, CardRow>(
    r#"
      SELECT id, title, notes, board_column, position, created_at, updated_at
      FROM planner_cards
      WHERE id = ?
      LIMIT 1;
    "#,
  )
  .bind(id)
  .fetch_optional(pool)
  .await?;

  row.map(card_from_row).transpose()
}

/// Appends a card to the end of `column`.
pub async fn create_planner_card(
  pool: &MySqlPool,
  title: &str,
  notes: &str,
  column: PlannerColumn,
) -> Result<PlannerCard, DashboardError> {
  let cards = list_planner_cards(pool).await?;
  let position = next_position(&cards, column);

  let result = sqlx::query(
    r#"
      INSERT INTO planner_cards (title, notes, board_column, position)
      VALUES (?, ?, ?, ?);
    "#,
  )
  .bind(title)
  .bind(notes)
  .bind(column.key())
  .bind(position)
  .execute(pool)
  .await?;

  let id = result.last_insert_id() as i64;
  fetch_card(pool, id)
    .await?
    .ok_or_else(|| DashboardError::Database(format!("card {id} vanished after insert")))
}

pub async fn update_planner_card_text(
  pool: &MySqlPool,
  id: i64,
  title: Option<&str>,
  notes: Option<&str>,
) -> Result<Option<PlannerCard>, DashboardError> {
  sqlx::query(
    r#"
      UPDATE planner_cards
      SET title = COALESCE(?, title),
          notes = COALESCE(?, notes),
          updated_at = CURRENT_TIMESTAMP(3)
      WHERE id = ?;
    "#,
  )
  .bind(title)
  .bind(notes)
  .bind(id)
  .execute(pool)
  .await?;

  fetch_card(pool, id).await
}

async fn apply_positions(
  tx: &mut sqlx::Transaction<'_, sqlx::MySql>,
  updates: &[PositionUpdate],
) -> Result<(), DashboardError> {
  for u in updates {
    sqlx::query(
      r#"
        UPDATE planner_cards
        SET board_column = ?, position = ?, updated_at = CURRENT_TIMESTAMP(3)
        WHERE id = ?;
      "#,
    )
    .bind(u.column.key())
    .bind(u.position)
    .bind(u.id)
    .execute(&mut **tx)
    .await?;
  }
  Ok(())
}

pub async fn move_planner_card(
  pool: &MySqlPool,
  id: i64,
  to_column: PlannerColumn,
  to_index: usize,
) -> Result<Vec<PlannerCard>, DashboardError> {
  let cards = list_planner_cards(pool).await?;
  let updates = plan_move(&cards, id, to_column, to_index)?;

  let mut tx = pool.begin().await?;
  apply_positions(&mut tx, &updates).await?;
  tx.commit().await?;

  list_planner_cards(pool).await
}

/// Returns whether a card was deleted.
pub async fn delete_planner_card(pool: &MySqlPool, id: i64) -> Result<bool, DashboardError> {
  let cards = list_planner_cards(pool).await?;
  if !cards.iter().any(|c| c.id == id) {
    return Ok(false);
  }
  let updates = plan_delete(&cards, id);

  let mut tx = pool.begin().await?;
  sqlx::query("DELETE FROM planner_cards WHERE id = ?;")
    .bind(id)
    .execute(&mut *tx)
    .await?;
  apply_positions(&mut tx, &updates).await?;
  tx.commit().await?;

  Ok(true)
}
