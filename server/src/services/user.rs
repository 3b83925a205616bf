//! User accounts: registration, credential checks, lookup.
//!
//! ERROR HANDLING
//! ==============
//! Unknown email and wrong password both surface as `InvalidCredentials` so
//! the login endpoint does not reveal which accounts exist. Duplicate emails
//! are detected via the `uq_users_email` constraint rather than a pre-check,
//! so concurrent registrations cannot both succeed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::password::{self, MIN_PASSWORD_LEN};

// =============================================================================
// TYPES
// =============================================================================

const MAX_DISPLAY_NAME_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),
    #[error("email already registered")]
    EmailInUse,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user not found: {0}")]
    NotFound(Uuid),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for UserError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Hash(_) => "INTERNAL_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Trim and lowercase an email, rejecting anything without a plausible
/// `local@domain.tld` shape.
pub(crate) fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(UserError::Validation("email is not a valid address".into()))
    }
}

pub(crate) fn check_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::Validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    Ok(())
}

pub(crate) fn normalize_display_name(raw: Option<&str>) -> Result<Option<String>, UserError> {
    let Some(name) = raw.map(str::trim) else {
        return Ok(None);
    };
    let len = name.chars().count();
    if len == 0 || len > MAX_DISPLAY_NAME_LEN {
        return Err(UserError::Validation(format!(
            "displayName must be between 1 and {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(Some(name.to_owned()))
}

// =============================================================================
// OPERATIONS
// =============================================================================

async fn hash_blocking(password: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| UserError::Hash(e.to_string()))?
        .map_err(|e| UserError::Hash(e.to_string()))
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| UserError::Hash(e.to_string()))?
        .map_err(|e| UserError::Hash(e.to_string()))
}

/// Create an account.
///
/// # Errors
///
/// `Validation` for malformed input, `EmailInUse` for a duplicate address.
pub async fn register(
    pool: &PgPool,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<UserRow, UserError> {
    let email = normalize_email(email)?;
    check_password(password)?;
    let display_name = normalize_display_name(display_name)?;
    let password_hash = hash_blocking(password.to_owned()).await?;

    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email, password_hash, display_name)
         VALUES ($1, $2, $3, $4)
         RETURNING id, email, display_name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&password_hash)
    .bind(&display_name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e, "uq_users_email") {
            UserError::EmailInUse
        } else {
            UserError::Database(e)
        }
    })
}

/// Check credentials and return the account.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or wrong password.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<UserRow, UserError> {
    let email = normalize_email(email).map_err(|_| UserError::InvalidCredentials)?;
    let row = sqlx::query_as::<_, (Uuid, String, Option<String>, DateTime<Utc>, String)>(
        "SELECT id, email, display_name, created_at, password_hash FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some((id, email, display_name, created_at, password_hash)) = row else {
        return Err(UserError::InvalidCredentials);
    };
    if !verify_blocking(password.to_owned(), password_hash).await? {
        return Err(UserError::InvalidCredentials);
    }
    Ok(UserRow { id, email, display_name, created_at })
}

/// Look up an account by id.
///
/// # Errors
///
/// `NotFound` if the user was deleted after the token was issued.
pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<UserRow, UserError> {
    sqlx::query_as::<_, UserRow>("SELECT id, email, display_name, created_at FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound(user_id))
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
