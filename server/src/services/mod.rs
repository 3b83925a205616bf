//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business rules and persistence so route handlers can
//! stay focused on request parsing, auth plumbing and status mapping. Every
//! query is scoped by the owning user id; a row owned by someone else is
//! indistinguishable from a missing row.
//!
//! `lifecycle` is the only module without I/O. It decides which goal edits
//! are legal and is called by `goal` before anything is written.

pub mod goal;
pub mod journal;
pub mod lifecycle;
pub mod moodboard;
pub mod password;
pub mod progress;
pub mod token;
pub mod user;

/// Postgres `unique_violation` on the named constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Validate an inclusive calendar year range shared by every yearly record.
pub(crate) fn check_year(year: i32) -> Result<(), String> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(format!("year must be between {MIN_YEAR} and {MAX_YEAR}"))
    }
}

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// Calendar year "now" in UTC.
#[must_use]
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}
