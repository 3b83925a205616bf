//! Goal service: CRUD plus the complete / drop / carry-forward transitions.
//!
//! DESIGN
//! ======
//! Every mutation of an existing goal runs inside a transaction that locks
//! the row (`SELECT ... FOR UPDATE`), asks [`lifecycle::check_update`] which
//! part of the patch is legal for the goal's stored year, and only then
//! writes. A denied patch writes nothing.
//!
//! Milestones are stored as a JSONB array on the goal row; they have no
//! lifecycle of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::check_year;
use crate::services::lifecycle::{self, Denial, GoalPatch, GoalStatus};

// =============================================================================
// TYPES
// =============================================================================

const MAX_DESCRIPTION_LEN: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Career,
    Finance,
    Learning,
    Relationships,
    Other,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Career => "career",
            Self::Finance => "finance",
            Self::Learning => "learning",
            Self::Relationships => "relationships",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "health" => Some(Self::Health),
            "career" => Some(Self::Career),
            "finance" => Some(Self::Finance),
            "learning" => Some(Self::Learning),
            "relationships" => Some(Self::Relationships),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A checklist step inside a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<i16>,
    pub year: i32,
    pub milestones: Vec<Milestone>,
    pub status: GoalStatus,
    pub completion_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct GoalRecord {
    id: Uuid,
    description: String,
    category: Option<String>,
    priority: Option<i16>,
    year: i32,
    milestones: Json<Vec<Milestone>>,
    status: String,
    completion_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GoalRecord> for Goal {
    fn from(r: GoalRecord) -> Self {
        Self {
            id: r.id,
            description: r.description,
            category: r.category.as_deref().and_then(Category::parse),
            priority: r.priority,
            year: r.year,
            milestones: r.milestones.0,
            // `ck_goals_status` restricts the column to known values.
            status: GoalStatus::parse(&r.status).unwrap_or(GoalStatus::InProgress),
            completion_note: r.completion_note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Fields accepted when creating a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<i16>,
    pub year: i32,
    pub milestones: Vec<Milestone>,
    pub status: Option<GoalStatus>,
}

#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("{0}")]
    Validation(String),
    #[error("goal not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for GoalError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "GOAL_NOT_FOUND",
            Self::Denied(denial) => denial.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

const GOAL_COLUMNS: &str =
    "id, description, category, priority, year, milestones, status, completion_note, created_at, updated_at";

// =============================================================================
// VALIDATION
// =============================================================================

fn check_description(description: &str) -> Result<(), GoalError> {
    let len = description.trim().chars().count();
    if len == 0 || description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(GoalError::Validation(format!(
            "description must be between 1 and {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

fn check_priority(priority: i16) -> Result<(), GoalError> {
    if (1..=3).contains(&priority) {
        Ok(())
    } else {
        Err(GoalError::Validation("priority must be 1, 2 or 3".into()))
    }
}

fn check_milestones(milestones: &[Milestone]) -> Result<(), GoalError> {
    for milestone in milestones {
        if milestone.title.trim().is_empty() {
            return Err(GoalError::Validation("milestone title must not be empty".into()));
        }
        if let Some(due) = milestone.due_date.as_deref() {
            if DateTime::parse_from_rfc3339(due).is_err() {
                return Err(GoalError::Validation(format!("milestone dueDate '{due}' is not an RFC 3339 timestamp")));
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_new(goal: &NewGoal) -> Result<(), GoalError> {
    check_description(&goal.description)?;
    if let Some(priority) = goal.priority {
        check_priority(priority)?;
    }
    check_milestones(&goal.milestones)
}

pub(crate) fn validate_patch(patch: &GoalPatch) -> Result<(), GoalError> {
    if let Some(description) = patch.description.as_deref() {
        check_description(description)?;
    }
    if let Some(priority) = patch.priority {
        check_priority(priority)?;
    }
    if let Some(milestones) = patch.milestones.as_deref() {
        check_milestones(milestones)?;
    }
    if let Some(year) = patch.year {
        check_year(year).map_err(GoalError::Validation)?;
    }
    Ok(())
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a goal for the current or a future year.
///
/// # Errors
///
/// `Denied(PastYearCreate)` for a past year (checked before anything else),
/// `Validation` for malformed fields.
pub async fn create_goal(pool: &PgPool, user_id: Uuid, goal: NewGoal, current_year: i32) -> Result<Goal, GoalError> {
    lifecycle::check_create(goal.year, current_year)?;
    check_year(goal.year).map_err(GoalError::Validation)?;
    validate_new(&goal)?;

    let record = sqlx::query_as::<_, GoalRecord>(&format!(
        "INSERT INTO goals (id, user_id, description, category, priority, year, milestones, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {GOAL_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(goal.description.trim())
    .bind(goal.category.map(Category::as_str))
    .bind(goal.priority)
    .bind(goal.year)
    .bind(Json(&goal.milestones))
    .bind(goal.status.unwrap_or(GoalStatus::InProgress).as_str())
    .fetch_one(pool)
    .await?;

    Ok(record.into())
}

/// List the caller's goals, optionally for one year, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_goals(pool: &PgPool, user_id: Uuid, year: Option<i32>) -> Result<Vec<Goal>, GoalError> {
    let records = sqlx::query_as::<_, GoalRecord>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals
         WHERE user_id = $1 AND ($2::INTEGER IS NULL OR year = $2)
         ORDER BY created_at DESC, id"
    ))
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(records.into_iter().map(Goal::from).collect())
}

/// Fetch one of the caller's goals.
///
/// # Errors
///
/// `NotFound` if the goal doesn't exist or belongs to another user.
pub async fn get_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> Result<Goal, GoalError> {
    sqlx::query_as::<_, GoalRecord>(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"))
        .bind(goal_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .map(Goal::from)
        .ok_or(GoalError::NotFound(goal_id))
}

async fn lock_goal(tx: &mut Transaction<'_, Postgres>, user_id: Uuid, goal_id: Uuid) -> Result<Goal, GoalError> {
    sqlx::query_as::<_, GoalRecord>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .map(Goal::from)
    .ok_or(GoalError::NotFound(goal_id))
}

/// Lock the goal, build the patch from the locked row, check it against
/// the lifecycle rules, validate what remains, then write.
async fn apply_patch<F>(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    current_year: i32,
    build: F,
) -> Result<Goal, GoalError>
where
    F: FnOnce(&Goal) -> Result<GoalPatch, GoalError>,
{
    let mut tx = pool.begin().await?;
    let existing = lock_goal(&mut tx, user_id, goal_id).await?;
    let patch = build(&existing)?;
    let allowed = lifecycle::check_update(existing.year, patch, current_year)?;
    validate_patch(&allowed)?;
    if allowed.is_empty() {
        tx.commit().await?;
        return Ok(existing);
    }

    // Reopening clears any note left by an earlier complete/drop.
    let record = sqlx::query_as::<_, GoalRecord>(&format!(
        "UPDATE goals SET
            description = COALESCE($3, description),
            category = COALESCE($4, category),
            priority = COALESCE($5, priority),
            milestones = COALESCE($6, milestones),
            year = COALESCE($7, year),
            status = COALESCE($8, status),
            completion_note = CASE
                WHEN $8::TEXT = 'in_progress' THEN $9
                ELSE COALESCE($9, completion_note)
            END,
            updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING {GOAL_COLUMNS}"
    ))
    .bind(goal_id)
    .bind(user_id)
    .bind(allowed.description.as_deref().map(str::trim))
    .bind(allowed.category.map(Category::as_str))
    .bind(allowed.priority)
    .bind(allowed.milestones.as_ref().map(Json))
    .bind(allowed.year)
    .bind(allowed.status.map(GoalStatus::as_str))
    .bind(allowed.completion_note.as_deref())
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!(%goal_id, from_year = existing.year, status = record.status.as_str(), "goal updated");
    Ok(record.into())
}

/// Apply a patch, subject to the year-based lifecycle rules.
///
/// Lifecycle denials are reported before field validation, so a past-year
/// goal answers with the rule it breaks even when the patch is malformed.
///
/// # Errors
///
/// `NotFound` for a missing or foreign goal, `Denied` when the rules refuse
/// the patch (nothing is written), `Validation` for malformed fields.
pub async fn update_goal(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    patch: GoalPatch,
    current_year: i32,
) -> Result<Goal, GoalError> {
    apply_patch(pool, user_id, goal_id, current_year, |_| Ok(patch)).await
}

/// Mark a goal completed, optionally with a note.
///
/// # Errors
///
/// Same as [`update_goal`].
pub async fn complete_goal(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    note: Option<String>,
    current_year: i32,
) -> Result<Goal, GoalError> {
    update_goal(pool, user_id, goal_id, GoalPatch::complete(note), current_year).await
}

/// Mark a goal dropped, optionally with a note.
///
/// # Errors
///
/// Same as [`update_goal`].
pub async fn drop_goal(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    note: Option<String>,
    current_year: i32,
) -> Result<Goal, GoalError> {
    update_goal(pool, user_id, goal_id, GoalPatch::drop_goal(note), current_year).await
}

/// Move a goal into a later year (default: the following year) and reopen it.
///
/// # Errors
///
/// `Validation` if `target_year` is not after the goal's year, otherwise the
/// same as [`update_goal`].
pub async fn carry_forward_goal(
    pool: &PgPool,
    user_id: Uuid,
    goal_id: Uuid,
    target_year: Option<i32>,
    current_year: i32,
) -> Result<Goal, GoalError> {
    apply_patch(pool, user_id, goal_id, current_year, |goal| {
        let target = target_year.unwrap_or(goal.year + 1);
        if target <= goal.year {
            return Err(GoalError::Validation(format!("carry-forward year must be after {}", goal.year)));
        }
        Ok(GoalPatch::carry_forward(target))
    })
    .await
}

/// Delete a current- or future-year goal and its progress entries.
///
/// # Errors
///
/// `NotFound` for a missing or foreign goal, `Denied(PastYearDelete)` for a
/// past-year goal.
pub async fn delete_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid, current_year: i32) -> Result<(), GoalError> {
    let mut tx = pool.begin().await?;
    let existing = lock_goal(&mut tx, user_id, goal_id).await?;
    lifecycle::check_delete(existing.year, current_year)?;

    sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
#[path = "goal_test.rs"]
mod tests;
