//! Achievements and reflections: free-text notes filed under a year.
//!
//! Both tables have the same shape, so one set of operations serves both;
//! [`JournalKind`] picks the table. Table names come from a closed enum and
//! never from request input.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::check_year;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalKind {
    Achievement,
    Reflection,
}

impl JournalKind {
    fn table(self) -> &'static str {
        match self {
            Self::Achievement => "achievements",
            Self::Reflection => "reflections",
        }
    }

    /// Human-readable entity name used in error messages.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Achievement => "achievement",
            Self::Reflection => "reflection",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub year: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct JournalPatch {
    pub year: Option<i32>,
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("{0}")]
    Validation(String),
    #[error("{noun} not found: {id}", noun = .0.noun(), id = .1)]
    NotFound(JournalKind, Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for JournalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(JournalKind::Achievement, _) => "ACHIEVEMENT_NOT_FOUND",
            Self::NotFound(JournalKind::Reflection, _) => "REFLECTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

const ENTRY_COLUMNS: &str = "id, year, text, created_at, updated_at";

pub(crate) fn normalize_text(raw: &str) -> Result<String, JournalError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(JournalError::Validation("text must not be empty".into()));
    }
    Ok(text.to_owned())
}

/// The caller's entries, newest first, optionally for one year.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_entries(
    pool: &PgPool,
    kind: JournalKind,
    user_id: Uuid,
    year: Option<i32>,
) -> Result<Vec<JournalEntry>, JournalError> {
    let entries = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM {} WHERE user_id = $1 AND ($2::INTEGER IS NULL OR year = $2)
         ORDER BY created_at DESC, id",
        kind.table()
    ))
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// # Errors
///
/// `Validation` for empty text or an unsupported year.
pub async fn create_entry(
    pool: &PgPool,
    kind: JournalKind,
    user_id: Uuid,
    year: i32,
    text: &str,
) -> Result<JournalEntry, JournalError> {
    check_year(year).map_err(JournalError::Validation)?;
    let text = normalize_text(text)?;

    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        "INSERT INTO {} (id, user_id, year, text) VALUES ($1, $2, $3, $4) RETURNING {ENTRY_COLUMNS}",
        kind.table()
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(year)
    .bind(&text)
    .fetch_one(pool)
    .await?;
    Ok(entry)
}

/// # Errors
///
/// `Validation` for empty text or an unsupported year, `NotFound` for a
/// missing or foreign entry.
pub async fn update_entry(
    pool: &PgPool,
    kind: JournalKind,
    user_id: Uuid,
    entry_id: Uuid,
    patch: JournalPatch,
) -> Result<JournalEntry, JournalError> {
    if let Some(year) = patch.year {
        check_year(year).map_err(JournalError::Validation)?;
    }
    let text = patch.text.as_deref().map(normalize_text).transpose()?;

    sqlx::query_as::<_, JournalEntry>(&format!(
        "UPDATE {} SET
            year = COALESCE($3, year),
            text = COALESCE($4, text),
            updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {ENTRY_COLUMNS}",
        kind.table()
    ))
    .bind(entry_id)
    .bind(user_id)
    .bind(patch.year)
    .bind(text)
    .fetch_optional(pool)
    .await?
    .ok_or(JournalError::NotFound(kind, entry_id))
}

/// # Errors
///
/// `NotFound` for a missing or foreign entry.
pub async fn delete_entry(pool: &PgPool, kind: JournalKind, user_id: Uuid, entry_id: Uuid) -> Result<(), JournalError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", kind.table()))
        .bind(entry_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(JournalError::NotFound(kind, entry_id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "journal_test.rs"]
mod tests;
