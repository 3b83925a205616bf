//! Progress entry routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::AuthUser;
use crate::routes::{ListResponse, YearQuery};
use crate::services::progress::{self, Mood, NewProgress, Period, ProgressEntry, ProgressError, ProgressPatch};
use crate::state::AppState;

/// Body for creating an entry. `date` is `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProgressBody {
    pub period: Period,
    pub date: NaiveDate,
    pub progress_value: Option<i16>,
    pub note: Option<String>,
    pub mood: Option<Mood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressBody {
    pub period: Option<Period>,
    pub date: Option<NaiveDate>,
    pub progress_value: Option<i16>,
    pub note: Option<String>,
    pub mood: Option<Mood>,
}

/// `GET /api/v1/progress?year=`
pub async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> Result<Json<ListResponse<ProgressEntry>>, ApiError> {
    let entries = progress::list_for_user(&state.pool, auth.user_id, query.year)
        .await
        .map_err(progress_error_to_api)?;
    Ok(Json(entries.into()))
}

/// `GET /api/v1/goals/{goal_id}/progress`
pub async fn list_for_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
) -> Result<Json<ListResponse<ProgressEntry>>, ApiError> {
    let entries = progress::list_for_goal(&state.pool, auth.user_id, goal_id)
        .await
        .map_err(progress_error_to_api)?;
    Ok(Json(entries.into()))
}

/// `POST /api/v1/goals/{goal_id}/progress`
pub async fn create_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CreateProgressBody>,
) -> Result<(StatusCode, Json<ProgressEntry>), ApiError> {
    let entry = NewProgress {
        period: body.period,
        date: body.date,
        progress_value: body.progress_value,
        note: body.note,
        mood: body.mood,
    };
    let created = progress::create_progress(&state.pool, auth.user_id, goal_id, entry)
        .await
        .map_err(progress_error_to_api)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/v1/progress/{progress_id}`
pub async fn update_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(progress_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateProgressBody>,
) -> Result<Json<ProgressEntry>, ApiError> {
    let patch = ProgressPatch {
        period: body.period,
        date: body.date,
        progress_value: body.progress_value,
        note: body.note,
        mood: body.mood,
    };
    let updated = progress::update_progress(&state.pool, auth.user_id, progress_id, patch)
        .await
        .map_err(progress_error_to_api)?;
    Ok(Json(updated))
}

/// `DELETE /api/v1/progress/{progress_id}`
pub async fn delete_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(progress_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    progress::delete_progress(&state.pool, auth.user_id, progress_id)
        .await
        .map_err(progress_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn progress_error_to_api(err: ProgressError) -> ApiError {
    match err {
        ProgressError::Validation(_) => ApiError::from_service(StatusCode::BAD_REQUEST, &err),
        ProgressError::GoalNotFound(_) | ProgressError::NotFound(_) => {
            ApiError::from_service(StatusCode::NOT_FOUND, &err)
        }
        ProgressError::Database(ref e) => ApiError::database(e),
    }
}
