//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every JSON endpoint lives under `/api/v1` and, except for the auth entry
//! points, requires an access token via [`auth::AuthUser`]. `/api/health` is
//! the unauthenticated liveness probe. CORS allows exactly the configured
//! frontend origin with credentials so the refresh cookie can flow.

pub mod auth;
pub mod goals;
pub mod journal;
pub mod moodboard;
pub mod progress;

use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::Json;
use axum::routing::{get, patch, post};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// `{items, total}` envelope used by every list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        let total = items.len();
        Self { items, total }
    }
}

/// Optional `?year=` filter shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/goals", get(goals::list_goals).post(goals::create_goal))
        .route(
            "/goals/{goal_id}",
            get(goals::get_goal).patch(goals::update_goal).delete(goals::delete_goal),
        )
        .route("/goals/{goal_id}/complete", post(goals::complete_goal))
        .route("/goals/{goal_id}/drop", post(goals::drop_goal))
        .route("/goals/{goal_id}/carry-forward", post(goals::carry_forward_goal))
        .route(
            "/goals/{goal_id}/progress",
            get(progress::list_for_goal).post(progress::create_progress),
        )
        .route("/progress", get(progress::list_progress))
        .route(
            "/progress/{progress_id}",
            patch(progress::update_progress).delete(progress::delete_progress),
        )
        .route("/moodboard", get(moodboard::list_boards).post(moodboard::create_board))
        .route("/moodboard/year/{year}", get(moodboard::board_for_year))
        .route(
            "/moodboard/{board_id}",
            get(moodboard::get_board)
                .patch(moodboard::update_board)
                .delete(moodboard::delete_board),
        )
        .route(
            "/moodboard/{board_id}/items",
            get(moodboard::list_items).post(moodboard::create_item),
        )
        .route(
            "/moodboard/{board_id}/items/{item_id}",
            patch(moodboard::update_item).delete(moodboard::delete_item),
        )
        .route(
            "/achievements",
            get(journal::list_achievements).post(journal::create_achievement),
        )
        .route(
            "/achievements/{entry_id}",
            patch(journal::update_achievement).delete(journal::delete_achievement),
        )
        .route(
            "/reflections",
            get(journal::list_reflections).post(journal::create_reflection),
        )
        .route(
            "/reflections/{entry_id}",
            patch(journal::update_reflection).delete(journal::delete_reflection),
        )
}

/// Full application router.
///
/// # Errors
///
/// Returns an error if the configured CORS origin is not a valid header value.
pub fn app(state: AppState) -> Result<Router, String> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| format!("CORS_ORIGIN: {e}"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
