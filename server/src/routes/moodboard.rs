//! Mood board and board item routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use canvas::geometry::ItemKind;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiJson, ApiPath};
use crate::routes::auth::AuthUser;
use crate::routes::ListResponse;
use crate::services::current_year;
use crate::services::moodboard::{
    self, BoardPatch, ItemPatch, MoodBoard, MoodBoardItem, MoodboardError, NewBoard, NewItem, PositionInput,
};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBoardBody {
    pub year: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canvas_width: Option<f64>,
    pub canvas_height: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemBody {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub position: Option<PositionInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub position: Option<PositionInput>,
}

// =============================================================================
// BOARDS
// =============================================================================

/// `GET /api/v1/moodboard`
pub async fn list_boards(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListResponse<MoodBoard>>, ApiError> {
    let boards = moodboard::list_boards(&state.pool, auth.user_id).await.map_err(moodboard_error_to_api)?;
    Ok(Json(boards.into()))
}

/// `GET /api/v1/moodboard/year/{year}`: get or create.
pub async fn board_for_year(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(year): ApiPath<i32>,
) -> Result<Json<MoodBoard>, ApiError> {
    let board = moodboard::board_for_year(&state.pool, auth.user_id, year)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(Json(board))
}

/// `POST /api/v1/moodboard`
pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateBoardBody>,
) -> Result<(StatusCode, Json<MoodBoard>), ApiError> {
    let new = NewBoard { year: body.year, title: body.title, description: body.description };
    let board = moodboard::create_board(&state.pool, auth.user_id, new, current_year())
        .await
        .map_err(moodboard_error_to_api)?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// `GET /api/v1/moodboard/{board_id}`
pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<Json<MoodBoard>, ApiError> {
    let board = moodboard::get_board(&state.pool, auth.user_id, board_id)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(Json(board))
}

/// `PATCH /api/v1/moodboard/{board_id}`: title, description or canvas size.
pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateBoardBody>,
) -> Result<Json<MoodBoard>, ApiError> {
    let patch = BoardPatch {
        title: body.title,
        description: body.description,
        canvas_width: body.canvas_width,
        canvas_height: body.canvas_height,
    };
    let board = moodboard::update_board(&state.pool, auth.user_id, board_id, patch)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(Json(board))
}

/// `DELETE /api/v1/moodboard/{board_id}`
pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    moodboard::delete_board(&state.pool, auth.user_id, board_id)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ITEMS
// =============================================================================

/// `GET /api/v1/moodboard/{board_id}/items`
pub async fn list_items(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
) -> Result<Json<ListResponse<MoodBoardItem>>, ApiError> {
    let items = moodboard::list_items(&state.pool, auth.user_id, board_id)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(Json(items.into()))
}

/// `POST /api/v1/moodboard/{board_id}/items`
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(board_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateItemBody>,
) -> Result<(StatusCode, Json<MoodBoardItem>), ApiError> {
    let new = NewItem { kind: body.kind, content: body.content, tags: body.tags, position: body.position };
    let item = moodboard::create_item(&state.pool, auth.user_id, board_id, new)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PATCH /api/v1/moodboard/{board_id}/items/{item_id}`
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((board_id, item_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(body): ApiJson<UpdateItemBody>,
) -> Result<Json<MoodBoardItem>, ApiError> {
    let patch = ItemPatch { kind: body.kind, content: body.content, tags: body.tags, position: body.position };
    let item = moodboard::update_item(&state.pool, auth.user_id, board_id, item_id, patch)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(Json(item))
}

/// `DELETE /api/v1/moodboard/{board_id}/items/{item_id}`
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((board_id, item_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    moodboard::delete_item(&state.pool, auth.user_id, board_id, item_id)
        .await
        .map_err(moodboard_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn moodboard_error_to_api(err: MoodboardError) -> ApiError {
    match err {
        MoodboardError::Validation(_) => ApiError::from_service(StatusCode::BAD_REQUEST, &err),
        MoodboardError::BoardNotFound(_) | MoodboardError::ItemNotFound(_) => {
            ApiError::from_service(StatusCode::NOT_FOUND, &err)
        }
        MoodboardError::BoardExists(_) => ApiError::from_service(StatusCode::CONFLICT, &err),
        MoodboardError::Database(ref e) => ApiError::database(e),
    }
}

#[cfg(test)]
#[path = "moodboard_test.rs"]
mod tests;
