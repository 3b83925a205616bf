//! Goal routes, including the complete / drop / carry-forward transitions.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::AuthUser;
use crate::routes::{ListResponse, YearQuery};
use crate::services::current_year;
use crate::services::goal::{self, Category, Goal, GoalError, Milestone, NewGoal};
use crate::services::lifecycle::{Denial, GoalPatch, GoalStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalBody {
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<i16>,
    pub year: i32,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalBody {
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<i16>,
    pub year: Option<i32>,
    pub milestones: Option<Vec<Milestone>>,
    pub status: Option<GoalStatus>,
    pub completion_note: Option<String>,
}

impl From<UpdateGoalBody> for GoalPatch {
    fn from(body: UpdateGoalBody) -> Self {
        Self {
            description: body.description,
            category: body.category,
            priority: body.priority,
            milestones: body.milestones,
            year: body.year,
            status: body.status,
            completion_note: body.completion_note,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CarryForwardBody {
    pub year: Option<i32>,
}

/// Parse an optional JSON body; an empty body yields `T::default()`.
pub(crate) fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))
}

/// `GET /api/v1/goals?year=`
pub async fn list_goals(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<YearQuery>,
) -> Result<Json<ListResponse<Goal>>, ApiError> {
    let goals = goal::list_goals(&state.pool, auth.user_id, query.year).await.map_err(goal_error_to_api)?;
    Ok(Json(goals.into()))
}

/// `POST /api/v1/goals`
pub async fn create_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateGoalBody>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    let new = NewGoal {
        description: body.description,
        category: body.category,
        priority: body.priority,
        year: body.year,
        milestones: body.milestones,
        status: body.status,
    };
    let created = goal::create_goal(&state.pool, auth.user_id, new, current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/v1/goals/{goal_id}`
pub async fn get_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
) -> Result<Json<Goal>, ApiError> {
    let found = goal::get_goal(&state.pool, auth.user_id, goal_id).await.map_err(goal_error_to_api)?;
    Ok(Json(found))
}

/// `PATCH /api/v1/goals/{goal_id}`
pub async fn update_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateGoalBody>,
) -> Result<Json<Goal>, ApiError> {
    let updated = goal::update_goal(&state.pool, auth.user_id, goal_id, body.into(), current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok(Json(updated))
}

/// `POST /api/v1/goals/{goal_id}/complete` with optional `{note}`.
pub async fn complete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<Json<Goal>, ApiError> {
    let NoteBody { note } = optional_json(&body)?;
    let updated = goal::complete_goal(&state.pool, auth.user_id, goal_id, note, current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok(Json(updated))
}

/// `POST /api/v1/goals/{goal_id}/drop` with optional `{note}`.
pub async fn drop_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<Json<Goal>, ApiError> {
    let NoteBody { note } = optional_json(&body)?;
    let updated = goal::drop_goal(&state.pool, auth.user_id, goal_id, note, current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok(Json(updated))
}

/// `POST /api/v1/goals/{goal_id}/carry-forward` with optional `{year}`.
pub async fn carry_forward_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
    body: Bytes,
) -> Result<Json<Goal>, ApiError> {
    let CarryForwardBody { year } = optional_json(&body)?;
    let updated = goal::carry_forward_goal(&state.pool, auth.user_id, goal_id, year, current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok(Json(updated))
}

/// `DELETE /api/v1/goals/{goal_id}`
pub async fn delete_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(goal_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    goal::delete_goal(&state.pool, auth.user_id, goal_id, current_year())
        .await
        .map_err(goal_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn goal_error_to_api(err: GoalError) -> ApiError {
    match err {
        GoalError::Validation(_) | GoalError::Denied(Denial::PastYearCreate) => {
            ApiError::from_service(StatusCode::BAD_REQUEST, &err)
        }
        GoalError::Denied(_) => ApiError::from_service(StatusCode::FORBIDDEN, &err),
        GoalError::NotFound(_) => ApiError::from_service(StatusCode::NOT_FOUND, &err),
        GoalError::Database(ref e) => ApiError::database(e),
    }
}

#[cfg(test)]
#[path = "goals_test.rs"]
mod tests;
