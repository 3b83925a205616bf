//! Auth routes: register, login, refresh, logout, current user.
//!
//! Access tokens travel in the `Authorization: Bearer` header (or an
//! `accessToken` cookie for clients that prefer it). Refresh tokens only ever
//! travel in an http-only cookie scoped to the refresh endpoint.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, ApiJson};
use crate::services::token::{self, TokenError, TokenKind};
use crate::services::user::{self, UserError, UserRow};
use crate::state::AppState;

const ACCESS_COOKIE_NAME: &str = "accessToken";
const REFRESH_COOKIE_NAME: &str = "refreshToken";
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth/refresh";

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated caller. Use as a handler parameter to require a valid
/// access token; extraction fails with 401 before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

pub(crate) fn bearer_token(parts: &axum::http::request::Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_owned())
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(ACCESS_COOKIE_NAME)
                .map(|c| c.value().to_owned())
                .filter(|v| !v.is_empty())
        });
        let Some(token) = token else {
            return Err(ApiError::unauthorized());
        };

        let app_state = AppState::from_ref(state);
        let user_id = token::verify(&token, TokenKind::Access, &app_state.config.jwt).map_err(|e| token_error_to_api(&e))?;
        Ok(Self { user_id })
    }
}

// =============================================================================
// COOKIES
// =============================================================================

fn refresh_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, token))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::days(config.jwt.refresh_expires_days))
        .build()
}

fn cleared_refresh_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE_NAME, ""))
        .path(REFRESH_COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserRow,
    pub access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

fn session_for(user: UserRow, config: &Config, jar: CookieJar) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let access_token = token::issue(user.id, TokenKind::Access, &config.jwt).map_err(|e| ApiError::internal(&e))?;
    let refresh_token = token::issue(user.id, TokenKind::Refresh, &config.jwt).map_err(|e| ApiError::internal(&e))?;
    let jar = jar.add(refresh_cookie(refresh_token, config));
    Ok((jar, Json(AuthResponse { user, access_token })))
}

/// `POST /api/v1/auth/register`
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<RegisterBody>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let user = user::register(&state.pool, &body.email, &body.password, body.display_name.as_deref())
        .await
        .map_err(user_error_to_api)?;
    tracing::info!(user_id = %user.id, "user registered");
    let (jar, body) = session_for(user, &state.config, jar)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// `POST /api/v1/auth/login`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user = user::authenticate(&state.pool, &body.email, &body.password)
        .await
        .map_err(user_error_to_api)?;
    session_for(user, &state.config, jar)
}

/// `GET /api/v1/auth/me`
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserRow>, ApiError> {
    let user = user::get_user(&state.pool, auth.user_id).await.map_err(user_error_to_api)?;
    Ok(Json(user))
}

/// `POST /api/v1/auth/refresh`: swap a refresh cookie for a new access
/// token and a rotated refresh cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    let Some(raw) = jar.get(REFRESH_COOKIE_NAME).map(|c| c.value().to_owned()).filter(|v| !v.is_empty()) else {
        return Err(ApiError::unauthorized());
    };
    let user_id = token::verify(&raw, TokenKind::Refresh, &state.config.jwt).map_err(|e| token_error_to_api(&e))?;
    // The account may have been removed since the token was issued.
    let user = user::get_user(&state.pool, user_id).await.map_err(|e| match e {
        UserError::NotFound(_) => ApiError::unauthorized(),
        other => user_error_to_api(other),
    })?;

    let (jar, Json(session)) = session_for(user, &state.config, jar)?;
    Ok((jar, Json(AccessTokenResponse { access_token: session.access_token })))
}

/// `POST /api/v1/auth/logout`: clear the refresh cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.add(cleared_refresh_cookie(&state.config)), StatusCode::NO_CONTENT)
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn token_error_to_api(err: &TokenError) -> ApiError {
    ApiError::from_service(StatusCode::UNAUTHORIZED, err)
}

pub(crate) fn user_error_to_api(err: UserError) -> ApiError {
    match err {
        UserError::Validation(_) => ApiError::from_service(StatusCode::BAD_REQUEST, &err),
        UserError::EmailInUse => ApiError::from_service(StatusCode::CONFLICT, &err),
        UserError::InvalidCredentials => ApiError::from_service(StatusCode::UNAUTHORIZED, &err),
        UserError::NotFound(_) => ApiError::not_found("user"),
        UserError::Hash(_) => ApiError::internal(&err),
        UserError::Database(ref e) => ApiError::database(e),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
