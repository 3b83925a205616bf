//! Goal lifecycle rules: which edits a goal accepts given its year.
//!
//! DESIGN
//! ======
//! A goal's editability depends on two things: its status
//! (`in_progress | completed | dropped`) and its year epoch relative to the
//! current calendar year (`Past | Current | Future`). Current and future goals
//! accept any edit. Past-year goals are frozen except for two moves:
//!
//! 1. closing them out: status to `completed` or `dropped`, optionally with a
//!    completion note;
//! 2. carrying them forward: `year` strictly greater than the stored year,
//!    optionally reopening them as `in_progress`.
//!
//! Content edits (description, category, priority, milestones) on a past-year
//! goal reject the whole patch, even when combined with a legal status change.
//! A stale `year` (same or earlier) riding along with a pure status change is
//! dropped from the patch instead of rejecting it, so clients that echo the
//! full goal back still work.
//!
//! Everything here is pure and takes `current_year` as an argument; the
//! service layer supplies the clock.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::services::goal::{Category, Milestone};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    InProgress,
    Completed,
    Dropped,
}

impl GoalStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }

    /// `completed` or `dropped`.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Dropped)
    }
}

/// Where a goal's year sits relative to the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearEpoch {
    Past,
    Current,
    Future,
}

impl YearEpoch {
    #[must_use]
    pub fn of(goal_year: i32, current_year: i32) -> Self {
        match goal_year.cmp(&current_year) {
            std::cmp::Ordering::Less => Self::Past,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Future,
        }
    }
}

/// A requested goal edit. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalPatch {
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<i16>,
    pub milestones: Option<Vec<Milestone>>,
    pub year: Option<i32>,
    pub status: Option<GoalStatus>,
    pub completion_note: Option<String>,
}

impl GoalPatch {
    /// Close the goal as completed.
    #[must_use]
    pub fn complete(note: Option<String>) -> Self {
        Self { status: Some(GoalStatus::Completed), completion_note: note, ..Self::default() }
    }

    /// Close the goal as dropped.
    #[must_use]
    pub fn drop_goal(note: Option<String>) -> Self {
        Self { status: Some(GoalStatus::Dropped), completion_note: note, ..Self::default() }
    }

    /// Move the goal into `year` and reopen it.
    #[must_use]
    pub fn carry_forward(year: i32) -> Self {
        Self { year: Some(year), status: Some(GoalStatus::InProgress), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn touches_content(&self) -> bool {
        self.description.is_some() || self.category.is_some() || self.priority.is_some() || self.milestones.is_some()
    }
}

/// Why an operation on a goal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("cannot create goals in past years")]
    PastYearCreate,
    #[error("cannot edit other fields of past year goals")]
    PastYearFieldEdit,
    #[error("past year goals can only be moved to a later year")]
    PastYearBackdate,
    #[error("past year goals can only be reopened by moving them to a later year")]
    PastYearReopen,
    #[error("completion note on a past year goal requires completing, dropping or moving it")]
    PastYearNote,
    #[error("cannot delete past year goals")]
    PastYearDelete,
}

impl ErrorCode for Denial {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PastYearCreate => "PAST_YEAR_CREATE",
            Self::PastYearFieldEdit | Self::PastYearBackdate | Self::PastYearReopen | Self::PastYearNote => {
                "PAST_YEAR_EDIT"
            }
            Self::PastYearDelete => "PAST_YEAR_DELETE",
        }
    }
}

// =============================================================================
// RULES
// =============================================================================

/// May a goal be created for `year`?
///
/// # Errors
///
/// [`Denial::PastYearCreate`] when `year < current_year`.
pub fn check_create(year: i32, current_year: i32) -> Result<(), Denial> {
    match YearEpoch::of(year, current_year) {
        YearEpoch::Past => Err(Denial::PastYearCreate),
        YearEpoch::Current | YearEpoch::Future => Ok(()),
    }
}

/// May a goal stored under `goal_year` be deleted?
///
/// # Errors
///
/// [`Denial::PastYearDelete`] for past-year goals.
pub fn check_delete(goal_year: i32, current_year: i32) -> Result<(), Denial> {
    match YearEpoch::of(goal_year, current_year) {
        YearEpoch::Past => Err(Denial::PastYearDelete),
        YearEpoch::Current | YearEpoch::Future => Ok(()),
    }
}

/// Decide whether `patch` may be applied to a goal stored under `goal_year`.
///
/// Returns the patch to actually apply, which differs from the input only
/// when a stale year is dropped from a pure status change.
///
/// # Errors
///
/// A [`Denial`] naming the first rule the patch breaks. Nothing from a denied
/// patch may be applied.
pub fn check_update(goal_year: i32, patch: GoalPatch, current_year: i32) -> Result<GoalPatch, Denial> {
    if YearEpoch::of(goal_year, current_year) != YearEpoch::Past {
        return Ok(patch);
    }
    if patch.touches_content() {
        return Err(Denial::PastYearFieldEdit);
    }

    let mut allowed = patch;
    let moves_forward = allowed.year.is_some_and(|year| year > goal_year);
    if allowed.year.is_some() && !moves_forward {
        if allowed.status.is_none() {
            return Err(Denial::PastYearBackdate);
        }
        allowed.year = None;
    }

    if allowed.status == Some(GoalStatus::InProgress) && !moves_forward {
        return Err(Denial::PastYearReopen);
    }
    if allowed.completion_note.is_some() && !moves_forward && !allowed.status.is_some_and(GoalStatus::is_closed) {
        return Err(Denial::PastYearNote);
    }
    Ok(allowed)
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
