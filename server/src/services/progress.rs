//! Progress entries: dated check-ins recorded against a goal.
//!
//! DESIGN
//! ======
//! Entries carry their own `user_id` so every query can be scoped by owner
//! without joining `goals`. Creating an entry still verifies the goal belongs
//! to the caller. Entries are not subject to the goal lifecycle rules; a past
//! year goal can still receive late check-ins.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

const MAX_PROGRESS_VALUE: i16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Custom,
}

impl Period {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Custom => "custom",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Low,
    Neutral,
    High,
}

impl Mood {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Neutral => "neutral",
            Self::High => "high",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "neutral" => Some(Self::Neutral),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// The goal summary attached to entries in the cross-goal listing.
#[derive(Debug, Clone, Serialize)]
pub struct GoalRef {
    pub id: Uuid,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub period: Period,
    pub date: NaiveDate,
    pub progress_value: Option<i16>,
    pub note: Option<String>,
    pub mood: Option<Mood>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalRef>,
}

#[derive(sqlx::FromRow)]
struct ProgressRecord {
    id: Uuid,
    goal_id: Uuid,
    period: String,
    entry_date: NaiveDate,
    progress_value: Option<i16>,
    note: Option<String>,
    mood: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ProgressWithGoal {
    #[sqlx(flatten)]
    record: ProgressRecord,
    goal_description: String,
}

impl ProgressRecord {
    fn into_entry(self, goal: Option<GoalRef>) -> ProgressEntry {
        ProgressEntry {
            id: self.id,
            goal_id: self.goal_id,
            period: Period::parse(&self.period).unwrap_or(Period::Custom),
            date: self.entry_date,
            progress_value: self.progress_value,
            note: self.note,
            mood: self.mood.as_deref().and_then(Mood::parse),
            created_at: self.created_at,
            updated_at: self.updated_at,
            goal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProgress {
    pub period: Period,
    pub date: NaiveDate,
    pub progress_value: Option<i16>,
    pub note: Option<String>,
    pub mood: Option<Mood>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProgressPatch {
    pub period: Option<Period>,
    pub date: Option<NaiveDate>,
    pub progress_value: Option<i16>,
    pub note: Option<String>,
    pub mood: Option<Mood>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("{0}")]
    Validation(String),
    #[error("goal not found: {0}")]
    GoalNotFound(Uuid),
    #[error("progress entry not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for ProgressError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::GoalNotFound(_) => "GOAL_NOT_FOUND",
            Self::NotFound(_) => "PROGRESS_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

const PROGRESS_COLUMNS: &str =
    "id, goal_id, period, entry_date, progress_value, note, mood, created_at, updated_at";

// =============================================================================
// VALIDATION
// =============================================================================

pub(crate) fn check_progress_value(value: Option<i16>) -> Result<(), ProgressError> {
    match value {
        Some(v) if !(0..=MAX_PROGRESS_VALUE).contains(&v) => Err(ProgressError::Validation(format!(
            "progressValue must be between 0 and {MAX_PROGRESS_VALUE}"
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// CRUD
// =============================================================================

/// Every entry of the caller, newest date first, optionally restricted to
/// goals of one year. Each entry carries its goal's id and description.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_for_user(pool: &PgPool, user_id: Uuid, year: Option<i32>) -> Result<Vec<ProgressEntry>, ProgressError> {
    let rows = sqlx::query_as::<_, ProgressWithGoal>(
        "SELECT p.id, p.goal_id, p.period, p.entry_date, p.progress_value, p.note, p.mood,
                p.created_at, p.updated_at, g.description AS goal_description
         FROM progress_entries p
         JOIN goals g ON g.id = p.goal_id
         WHERE p.user_id = $1 AND ($2::INTEGER IS NULL OR g.year = $2)
         ORDER BY p.entry_date DESC, p.created_at DESC",
    )
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let goal = GoalRef { id: row.record.goal_id, description: row.goal_description };
            row.record.into_entry(Some(goal))
        })
        .collect())
}

/// Entries for one of the caller's goals, newest date first. A foreign or
/// missing goal simply has no entries.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_for_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> Result<Vec<ProgressEntry>, ProgressError> {
    let records = sqlx::query_as::<_, ProgressRecord>(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM progress_entries
         WHERE goal_id = $1 AND user_id = $2
         ORDER BY entry_date DESC, created_at DESC"
    ))
    .bind(goal_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records.into_iter().map(|r| r.into_entry(None)).collect())
}

/// Record a check-in against one of the caller's goals.
///
/// # Errors
///
/// `Validation` for an out-of-range value, `GoalNotFound` if the goal is
/// missing or foreign.
pub async fn create_progress(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    entry: NewProgress,
) -> Result<ProgressEntry, ProgressError> {
    check_progress_value(entry.progress_value)?;

    let owned = sqlx::query_scalar::<_, i32>("SELECT 1 FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if owned.is_none() {
        return Err(ProgressError::GoalNotFound(goal_id));
    }

    let record = sqlx::query_as::<_, ProgressRecord>(&format!(
        "INSERT INTO progress_entries (id, goal_id, user_id, period, entry_date, progress_value, note, mood)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {PROGRESS_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(goal_id)
    .bind(user_id)
    .bind(entry.period.as_str())
    .bind(entry.date)
    .bind(entry.progress_value)
    .bind(entry.note.as_deref())
    .bind(entry.mood.map(Mood::as_str))
    .fetch_one(pool)
    .await?;

    Ok(record.into_entry(None))
}

/// Patch one of the caller's entries.
///
/// # Errors
///
/// `Validation` for an out-of-range value, `NotFound` for a missing or
/// foreign entry.
pub async fn update_progress(
    pool: &PgPool,
    user_id: Uuid,
    progress_id: Uuid,
    patch: ProgressPatch,
) -> Result<ProgressEntry, ProgressError> {
    check_progress_value(patch.progress_value)?;

    sqlx::query_as::<_, ProgressRecord>(&format!(
        "UPDATE progress_entries SET
            period = COALESCE($3, period),
            entry_date = COALESCE($4, entry_date),
            progress_value = COALESCE($5, progress_value),
            note = COALESCE($6, note),
            mood = COALESCE($7, mood),
            updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {PROGRESS_COLUMNS}"
    ))
    .bind(progress_id)
    .bind(user_id)
    .bind(patch.period.map(Period::as_str))
    .bind(patch.date)
    .bind(patch.progress_value)
    .bind(patch.note.as_deref())
    .bind(patch.mood.map(Mood::as_str))
    .fetch_optional(pool)
    .await?
    .map(|r| r.into_entry(None))
    .ok_or(ProgressError::NotFound(progress_id))
}

/// Delete one of the caller's entries.
///
/// # Errors
///
/// `NotFound` for a missing or foreign entry.
pub async fn delete_progress(pool: &PgPool, user_id: Uuid, progress_id: Uuid) -> Result<(), ProgressError> {
    let result = sqlx::query("DELETE FROM progress_entries WHERE id = $1 AND user_id = $2")
        .bind(progress_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ProgressError::NotFound(progress_id));
    }
    Ok(())
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
