//! Achievement and reflection routes. Both share one handler set
//! parameterised by [`JournalKind`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::AuthUser;
use crate::routes::{ListResponse, YearQuery};
use crate::services::journal::{self, JournalEntry, JournalError, JournalKind, JournalPatch};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEntryBody {
    pub year: i32,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryBody {
    pub year: Option<i32>,
    pub text: Option<String>,
}

type ListResult = Result<Json<ListResponse<JournalEntry>>, ApiError>;
type CreateResult = Result<(StatusCode, Json<JournalEntry>), ApiError>;
type UpdateResult = Result<Json<JournalEntry>, ApiError>;

async fn list(state: AppState, kind: JournalKind, user_id: Uuid, query: YearQuery) -> ListResult {
    let entries = journal::list_entries(&state.pool, kind, user_id, query.year)
        .await
        .map_err(journal_error_to_api)?;
    Ok(Json(entries.into()))
}

async fn create(state: AppState, kind: JournalKind, user_id: Uuid, body: CreateEntryBody) -> CreateResult {
    let entry = journal::create_entry(&state.pool, kind, user_id, body.year, &body.text)
        .await
        .map_err(journal_error_to_api)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update(state: AppState, kind: JournalKind, user_id: Uuid, entry_id: Uuid, body: UpdateEntryBody) -> UpdateResult {
    let patch = JournalPatch { year: body.year, text: body.text };
    let entry = journal::update_entry(&state.pool, kind, user_id, entry_id, patch)
        .await
        .map_err(journal_error_to_api)?;
    Ok(Json(entry))
}

async fn delete(state: AppState, kind: JournalKind, user_id: Uuid, entry_id: Uuid) -> Result<StatusCode, ApiError> {
    journal::delete_entry(&state.pool, kind, user_id, entry_id)
        .await
        .map_err(journal_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ACHIEVEMENTS
// =============================================================================

/// `GET /api/v1/achievements?year=`
pub async fn list_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> ListResult {
    list(state, JournalKind::Achievement, auth.user_id, query).await
}

/// `POST /api/v1/achievements`
pub async fn create_achievement(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateEntryBody>,
) -> CreateResult {
    create(state, JournalKind::Achievement, auth.user_id, body).await
}

/// `PATCH /api/v1/achievements/{entry_id}`
pub async fn update_achievement(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateEntryBody>,
) -> UpdateResult {
    update(state, JournalKind::Achievement, auth.user_id, entry_id, body).await
}

/// `DELETE /api/v1/achievements/{entry_id}`
pub async fn delete_achievement(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(state, JournalKind::Achievement, auth.user_id, entry_id).await
}

// =============================================================================
// REFLECTIONS
// =============================================================================

/// `GET /api/v1/reflections?year=`
pub async fn list_reflections(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> ListResult {
    list(state, JournalKind::Reflection, auth.user_id, query).await
}

/// `POST /api/v1/reflections`
pub async fn create_reflection(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateEntryBody>,
) -> CreateResult {
    create(state, JournalKind::Reflection, auth.user_id, body).await
}

/// `PATCH /api/v1/reflections/{entry_id}`
pub async fn update_reflection(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(entry_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateEntryBody>,
) -> UpdateResult {
    update(state, JournalKind::Reflection, auth.user_id, entry_id, body).await
}

/// `DELETE /api/v1/reflections/{entry_id}`
pub async fn delete_reflection(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(entry_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    delete(state, JournalKind::Reflection, auth.user_id, entry_id).await
}

pub(crate) fn journal_error_to_api(err: JournalError) -> ApiError {
    match err {
        JournalError::Validation(_) => ApiError::from_service(StatusCode::BAD_REQUEST, &err),
        JournalError::NotFound(..) => ApiError::from_service(StatusCode::NOT_FOUND, &err),
        JournalError::Database(ref e) => ApiError::database(e),
    }
}
