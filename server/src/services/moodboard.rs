//! Mood boards and their image items.
//!
//! DESIGN
//! ======
//! Each user has at most one board per year (`uq_mood_boards_user_year`).
//! `board_for_year` is the get-or-create entry point used by the board page;
//! `create_board` is the explicit variant and reports a duplicate year.
//!
//! Item geometry is stored as flat nullable columns and exposed as
//! `canvas::geometry::Geometry` (or `null` when never placed). New items
//! without a position get a random spot from `canvas::layout`, and a
//! position without a `zIndex` is stacked above the board's other items.
//! Item writes lock the owning board row so concurrent inserts on one board
//! cannot pick the same z-index.
//!
//! Canvas resizes are plain board patches. Rescaled item geometry arrives
//! afterwards as independent item patches from the client.

use std::collections::HashMap;

use canvas::doc::BoardItem;
use canvas::geometry::{CanvasSize, Geometry, ItemKind};
use canvas::{layout, zorder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::{check_year, is_unique_violation};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodBoard {
    pub id: Uuid,
    pub year: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub items: Vec<MoodBoardItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A board item plus its timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodBoardItem {
    #[serde(flatten)]
    pub item: BoardItem,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct BoardRecord {
    id: Uuid,
    year: i32,
    title: Option<String>,
    description: Option<String>,
    canvas_width: f64,
    canvas_height: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BoardRecord {
    fn into_board(self, items: Vec<MoodBoardItem>) -> MoodBoard {
        MoodBoard {
            id: self.id,
            year: self.year,
            title: self.title,
            description: self.description,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRecord {
    id: Uuid,
    board_id: Uuid,
    kind: String,
    content: String,
    tags: Json<Vec<String>>,
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    z_index: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRecord> for MoodBoardItem {
    fn from(r: ItemRecord) -> Self {
        let position = match (r.x, r.y, r.width, r.height, r.z_index) {
            (Some(x), Some(y), Some(width), Some(height), Some(z_index)) => {
                Some(Geometry { x, y, width, height, z_index })
            }
            _ => None,
        };
        Self {
            item: BoardItem {
                id: r.id,
                board_id: r.board_id,
                // `ck_mood_board_items_kind` restricts the column to known values.
                kind: ItemKind::parse(&r.kind).unwrap_or(ItemKind::ImageUrl),
                content: r.content,
                tags: r.tags.0,
                position,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Geometry as sent by clients; `zIndex` may be omitted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: Option<i32>,
}

impl PositionInput {
    /// Fill a missing z-index from `fallback_z` and validate the result.
    pub(crate) fn resolve(self, fallback_z: impl FnOnce() -> i32) -> Result<Geometry, MoodboardError> {
        let z_index = self.z_index.unwrap_or_else(fallback_z);
        let geometry = Geometry { x: self.x, y: self.y, width: self.width, height: self.height, z_index };
        if geometry.is_valid() {
            Ok(geometry)
        } else {
            Err(MoodboardError::Validation(
                "position must be finite with positive width/height and zIndex >= 1".into(),
            ))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewBoard {
    pub year: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub kind: ItemKind,
    pub content: String,
    pub tags: Vec<String>,
    pub position: Option<PositionInput>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub kind: Option<ItemKind>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub position: Option<PositionInput>,
}

#[derive(Debug, thiserror::Error)]
pub enum MoodboardError {
    #[error("{0}")]
    Validation(String),
    #[error("mood board not found: {0}")]
    BoardNotFound(Uuid),
    #[error("mood board item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("a mood board for {0} already exists")]
    BoardExists(i32),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for MoodboardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BoardNotFound(_) => "BOARD_NOT_FOUND",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::BoardExists(_) => "BOARD_EXISTS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

const BOARD_COLUMNS: &str = "id, year, title, description, canvas_width, canvas_height, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, board_id, kind, content, tags, x, y, width, height, z_index, created_at, updated_at";

// =============================================================================
// VALIDATION
// =============================================================================

pub(crate) fn check_content(kind: ItemKind, content: &str) -> Result<(), MoodboardError> {
    if kind.accepts(content) {
        return Ok(());
    }
    let expected = match kind {
        ItemKind::ImageUrl => "an http(s) URL",
        ItemKind::ImageUpload => "a data:image/ URI",
    };
    Err(MoodboardError::Validation(format!("{} content must be {expected}", kind.as_str())))
}

fn check_dimension(name: &str, value: Option<f64>) -> Result<(), MoodboardError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(MoodboardError::Validation(format!("{name} must be a finite number greater than 0")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn validate_board_patch(patch: &BoardPatch) -> Result<(), MoodboardError> {
    check_dimension("canvasWidth", patch.canvas_width)?;
    check_dimension("canvasHeight", patch.canvas_height)
}

// =============================================================================
// HELPERS
// =============================================================================

async fn items_for_boards(pool: &PgPool, board_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<MoodBoardItem>>, sqlx::Error> {
    let records = sqlx::query_as::<_, ItemRecord>(&format!(
        "SELECT {ITEM_COLUMNS} FROM mood_board_items
         WHERE board_id = ANY($1)
         ORDER BY created_at, id"
    ))
    .bind(board_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<MoodBoardItem>> = HashMap::new();
    for record in records {
        grouped.entry(record.board_id).or_default().push(record.into());
    }
    Ok(grouped)
}

async fn with_items(pool: &PgPool, record: BoardRecord) -> Result<MoodBoard, MoodboardError> {
    let mut items = items_for_boards(pool, &[record.id]).await?;
    let board_items = items.remove(&record.id).unwrap_or_default();
    Ok(record.into_board(board_items))
}

async fn lock_board(tx: &mut Transaction<'_, Postgres>, user_id: Uuid, board_id: Uuid) -> Result<BoardRecord, MoodboardError> {
    sqlx::query_as::<_, BoardRecord>(&format!(
        "SELECT {BOARD_COLUMNS} FROM mood_boards WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(board_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(MoodboardError::BoardNotFound(board_id))
}

async fn board_z_indices(tx: &mut Transaction<'_, Postgres>, board_id: Uuid) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT z_index FROM mood_board_items WHERE board_id = $1 AND z_index IS NOT NULL")
        .bind(board_id)
        .fetch_all(&mut **tx)
        .await
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned())
}

// =============================================================================
// BOARDS
// =============================================================================

/// All of the caller's boards with their items, newest first.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn list_boards(pool: &PgPool, user_id: Uuid) -> Result<Vec<MoodBoard>, MoodboardError> {
    let records = sqlx::query_as::<_, BoardRecord>(&format!(
        "SELECT {BOARD_COLUMNS} FROM mood_boards WHERE user_id = $1 ORDER BY created_at DESC, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
    let mut items = items_for_boards(pool, &ids).await?;
    Ok(records
        .into_iter()
        .map(|r| {
            let board_items = items.remove(&r.id).unwrap_or_default();
            r.into_board(board_items)
        })
        .collect())
}

/// The caller's board for `year`, created with default canvas size if it
/// doesn't exist yet.
///
/// # Errors
///
/// `Validation` for a year outside the supported range.
pub async fn board_for_year(pool: &PgPool, user_id: Uuid, year: i32) -> Result<MoodBoard, MoodboardError> {
    check_year(year).map_err(MoodboardError::Validation)?;

    let inserted = sqlx::query("INSERT INTO mood_boards (id, user_id, year) VALUES ($1, $2, $3) ON CONFLICT (user_id, year) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(year)
        .execute(pool)
        .await?;
    if inserted.rows_affected() > 0 {
        tracing::info!(%user_id, year, "mood board created");
    }

    let record = sqlx::query_as::<_, BoardRecord>(&format!(
        "SELECT {BOARD_COLUMNS} FROM mood_boards WHERE user_id = $1 AND year = $2"
    ))
    .bind(user_id)
    .bind(year)
    .fetch_one(pool)
    .await?;
    with_items(pool, record).await
}

/// Explicitly create a board. `year` defaults to `current_year`.
///
/// # Errors
///
/// `BoardExists` if the caller already has a board for that year.
pub async fn create_board(
    pool: &PgPool,
    user_id: Uuid,
    board: NewBoard,
    current_year: i32,
) -> Result<MoodBoard, MoodboardError> {
    let year = board.year.unwrap_or(current_year);
    check_year(year).map_err(MoodboardError::Validation)?;

    let record = sqlx::query_as::<_, BoardRecord>(&format!(
        "INSERT INTO mood_boards (id, user_id, year, title, description)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {BOARD_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(year)
    .bind(trimmed(board.title))
    .bind(trimmed(board.description))
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "uq_mood_boards_user_year") {
            MoodboardError::BoardExists(year)
        } else {
            MoodboardError::Database(e)
        }
    })?;

    Ok(record.into_board(Vec::new()))
}

/// One of the caller's boards with its items.
///
/// # Errors
///
/// `BoardNotFound` for a missing or foreign board.
pub async fn get_board(pool: &PgPool, user_id: Uuid, board_id: Uuid) -> Result<MoodBoard, MoodboardError> {
    let record = sqlx::query_as::<_, BoardRecord>(&format!(
        "SELECT {BOARD_COLUMNS} FROM mood_boards WHERE id = $1 AND user_id = $2"
    ))
    .bind(board_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(MoodboardError::BoardNotFound(board_id))?;
    with_items(pool, record).await
}

/// Update title, description or canvas size.
///
/// # Errors
///
/// `Validation` for a non-finite or non-positive dimension, `BoardNotFound`
/// for a missing or foreign board.
pub async fn update_board(
    pool: &PgPool,
    user_id: Uuid,
    board_id: Uuid,
    patch: BoardPatch,
) -> Result<MoodBoard, MoodboardError> {
    validate_board_patch(&patch)?;

    let record = sqlx::query_as::<_, BoardRecord>(&format!(
        "UPDATE mood_boards SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            canvas_width = COALESCE($5, canvas_width),
            canvas_height = COALESCE($6, canvas_height),
            updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {BOARD_COLUMNS}"
    ))
    .bind(board_id)
    .bind(user_id)
    .bind(trimmed(patch.title))
    .bind(trimmed(patch.description))
    .bind(patch.canvas_width)
    .bind(patch.canvas_height)
    .fetch_optional(pool)
    .await?
    .ok_or(MoodboardError::BoardNotFound(board_id))?;

    if patch.canvas_width.is_some() || patch.canvas_height.is_some() {
        tracing::info!(%board_id, width = record.canvas_width, height = record.canvas_height, "canvas resized");
    }
    with_items(pool, record).await
}

/// Delete a board and all of its items.
///
/// # Errors
///
/// `BoardNotFound` for a missing or foreign board.
pub async fn delete_board(pool: &PgPool, user_id: Uuid, board_id: Uuid) -> Result<(), MoodboardError> {
    let result = sqlx::query("DELETE FROM mood_boards WHERE id = $1 AND user_id = $2")
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MoodboardError::BoardNotFound(board_id));
    }
    Ok(())
}

// =============================================================================
// ITEMS
// =============================================================================

/// Items of one of the caller's boards in creation order.
///
/// # Errors
///
/// `BoardNotFound` for a missing or foreign board.
pub async fn list_items(pool: &PgPool, user_id: Uuid, board_id: Uuid) -> Result<Vec<MoodBoardItem>, MoodboardError> {
    Ok(get_board(pool, user_id, board_id).await?.items)
}

/// Add an item. Without a position it is placed randomly on the board's
/// canvas; without a `zIndex` it goes on top.
///
/// # Errors
///
/// `Validation` for content that doesn't match the kind or an invalid
/// position, `BoardNotFound` for a missing or foreign board.
pub async fn create_item(
    pool: &PgPool,
    user_id: Uuid,
    board_id: Uuid,
    item: NewItem,
) -> Result<MoodBoardItem, MoodboardError> {
    check_content(item.kind, &item.content)?;

    let mut tx = pool.begin().await?;
    let board = lock_board(&mut tx, user_id, board_id).await?;
    let existing_z = board_z_indices(&mut tx, board_id).await?;
    let canvas = CanvasSize::new(board.canvas_width, board.canvas_height);

    let geometry = match item.position {
        Some(position) => position.resolve(|| zorder::next_z_index(existing_z.iter().copied()))?,
        None => layout::random_initial_placement(&mut rand::rng(), canvas, existing_z.iter().copied()),
    };

    let record = sqlx::query_as::<_, ItemRecord>(&format!(
        "INSERT INTO mood_board_items (id, board_id, kind, content, tags, x, y, width, height, z_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(board_id)
    .bind(item.kind.as_str())
    .bind(&item.content)
    .bind(Json(&item.tags))
    .bind(geometry.x)
    .bind(geometry.y)
    .bind(geometry.width)
    .bind(geometry.height)
    .bind(geometry.z_index)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(record.into())
}

/// Patch an item's kind, content, tags or geometry.
///
/// Kind and content are validated together against the stored values. A
/// position without `zIndex` keeps the item's current layer.
///
/// # Errors
///
/// `Validation`, `BoardNotFound` or `ItemNotFound`.
pub async fn update_item(
    pool: &PgPool,
    user_id: Uuid,
    board_id: Uuid,
    item_id: Uuid,
    patch: ItemPatch,
) -> Result<MoodBoardItem, MoodboardError> {
    let mut tx = pool.begin().await?;
    lock_board(&mut tx, user_id, board_id).await?;
    let current: MoodBoardItem = sqlx::query_as::<_, ItemRecord>(&format!(
        "SELECT {ITEM_COLUMNS} FROM mood_board_items WHERE id = $1 AND board_id = $2"
    ))
    .bind(item_id)
    .bind(board_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(MoodboardError::ItemNotFound(item_id))?
    .into();

    if patch.kind.is_some() || patch.content.is_some() {
        let kind = patch.kind.unwrap_or(current.item.kind);
        check_content(kind, patch.content.as_deref().unwrap_or(&current.item.content))?;
    }

    let geometry = match patch.position {
        Some(position) => {
            let existing_z = board_z_indices(&mut tx, board_id).await?;
            let current_z = current.item.position.map(|g| g.z_index);
            Some(position.resolve(|| current_z.unwrap_or_else(|| zorder::next_z_index(existing_z)))?)
        }
        None => None,
    };

    let record = sqlx::query_as::<_, ItemRecord>(&format!(
        "UPDATE mood_board_items SET
            kind = COALESCE($3, kind),
            content = COALESCE($4, content),
            tags = COALESCE($5, tags),
            x = COALESCE($6, x),
            y = COALESCE($7, y),
            width = COALESCE($8, width),
            height = COALESCE($9, height),
            z_index = COALESCE($10, z_index),
            updated_at = now()
         WHERE id = $1 AND board_id = $2
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(item_id)
    .bind(board_id)
    .bind(patch.kind.map(ItemKind::as_str))
    .bind(patch.content.as_deref())
    .bind(patch.tags.as_ref().map(Json))
    .bind(geometry.map(|g| g.x))
    .bind(geometry.map(|g| g.y))
    .bind(geometry.map(|g| g.width))
    .bind(geometry.map(|g| g.height))
    .bind(geometry.map(|g| g.z_index))
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(record.into())
}

/// Remove an item from one of the caller's boards.
///
/// # Errors
///
/// `BoardNotFound` or `ItemNotFound`.
pub async fn delete_item(pool: &PgPool, user_id: Uuid, board_id: Uuid, item_id: Uuid) -> Result<(), MoodboardError> {
    let mut tx = pool.begin().await?;
    lock_board(&mut tx, user_id, board_id).await?;
    let result = sqlx::query("DELETE FROM mood_board_items WHERE id = $1 AND board_id = $2")
        .bind(item_id)
        .bind(board_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(MoodboardError::ItemNotFound(item_id));
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "moodboard_test.rs"]
mod tests;
