use super::*;

const NOW: i32 = 2025;
const PAST: i32 = 2024;

fn status(s: GoalStatus) -> GoalPatch {
    GoalPatch { status: Some(s), ..GoalPatch::default() }
}

fn year(y: i32) -> GoalPatch {
    GoalPatch { year: Some(y), ..GoalPatch::default() }
}

// =============================================================
// Epochs
// =============================================================

#[test]
fn epoch_classification() {
    assert_eq!(YearEpoch::of(2024, NOW), YearEpoch::Past);
    assert_eq!(YearEpoch::of(2025, NOW), YearEpoch::Current);
    assert_eq!(YearEpoch::of(2030, NOW), YearEpoch::Future);
}

#[test]
fn status_names_round_trip() {
    for s in [GoalStatus::InProgress, GoalStatus::Completed, GoalStatus::Dropped] {
        assert_eq!(GoalStatus::parse(s.as_str()), Some(s));
    }
    assert_eq!(GoalStatus::parse("archived"), None);
}

// =============================================================
// Create / delete
// =============================================================

#[test]
fn create_in_past_year_always_denied() {
    for y in [2000, 2023, 2024] {
        assert_eq!(check_create(y, NOW), Err(Denial::PastYearCreate));
    }
    assert!(check_create(NOW, NOW).is_ok());
    assert!(check_create(NOW + 3, NOW).is_ok());
}

#[test]
fn past_year_create_message() {
    assert_eq!(Denial::PastYearCreate.to_string(), "cannot create goals in past years");
    assert_eq!(Denial::PastYearCreate.error_code(), "PAST_YEAR_CREATE");
}

#[test]
fn delete_only_current_or_future() {
    assert_eq!(check_delete(PAST, NOW), Err(Denial::PastYearDelete));
    assert!(check_delete(NOW, NOW).is_ok());
    assert!(check_delete(NOW + 1, NOW).is_ok());
}

// =============================================================
// Current / future goals
// =============================================================

#[test]
fn current_goal_accepts_anything() {
    let patch = GoalPatch {
        description: Some("Run a marathon".into()),
        category: Some(Category::Health),
        priority: Some(1),
        milestones: Some(Vec::new()),
        year: Some(NOW - 3),
        status: Some(GoalStatus::InProgress),
        completion_note: Some("n/a".into()),
    };
    assert_eq!(check_update(NOW, patch.clone(), NOW), Ok(patch.clone()));
    assert_eq!(check_update(NOW + 1, patch.clone(), NOW), Ok(patch));
}

// =============================================================
// Past-year goals
// =============================================================

#[test]
fn past_goal_pure_completion_allowed() {
    assert_eq!(check_update(PAST, status(GoalStatus::Completed), NOW), Ok(status(GoalStatus::Completed)));
    assert!(check_update(PAST, status(GoalStatus::Dropped), NOW).is_ok());
}

#[test]
fn past_goal_completion_with_note_allowed() {
    let patch = GoalPatch::complete(Some("ran 3 half marathons instead".into()));
    assert_eq!(check_update(PAST, patch.clone(), NOW), Ok(patch));
}

#[test]
fn past_goal_completion_with_description_rejected_in_full() {
    let patch = GoalPatch { description: Some("new text".into()), ..status(GoalStatus::Completed) };
    assert_eq!(check_update(PAST, patch, NOW), Err(Denial::PastYearFieldEdit));
    assert_eq!(Denial::PastYearFieldEdit.to_string(), "cannot edit other fields of past year goals");
}

#[test]
fn past_goal_any_content_field_rejected() {
    let patches = [
        GoalPatch { category: Some(Category::Career), ..GoalPatch::default() },
        GoalPatch { priority: Some(2), ..GoalPatch::default() },
        GoalPatch { milestones: Some(Vec::new()), ..GoalPatch::default() },
        GoalPatch { description: Some("x".into()), ..year(NOW) },
    ];
    for patch in patches {
        assert_eq!(check_update(PAST, patch, NOW), Err(Denial::PastYearFieldEdit));
    }
}

#[test]
fn past_goal_move_forward_allowed() {
    assert_eq!(check_update(PAST, year(PAST + 1), NOW), Ok(year(PAST + 1)));
    assert!(check_update(PAST - 5, year(PAST - 4), NOW).is_ok(), "forward but still past is a move forward");
    assert!(check_update(PAST, year(NOW + 2), NOW).is_ok());
}

#[test]
fn past_goal_same_or_earlier_year_rejected() {
    assert_eq!(check_update(PAST, year(PAST), NOW), Err(Denial::PastYearBackdate));
    assert_eq!(check_update(PAST, year(PAST - 1), NOW), Err(Denial::PastYearBackdate));
}

#[test]
fn stale_year_dropped_from_pure_status_change() {
    let patch = GoalPatch { year: Some(PAST), ..status(GoalStatus::Completed) };
    assert_eq!(check_update(PAST, patch, NOW), Ok(status(GoalStatus::Completed)));

    let patch = GoalPatch { year: Some(PAST - 1), ..GoalPatch::drop_goal(Some("no time".into())) };
    assert_eq!(check_update(PAST, patch, NOW), Ok(GoalPatch::drop_goal(Some("no time".into()))));
}

#[test]
fn reopen_requires_forward_move() {
    assert_eq!(check_update(PAST, status(GoalStatus::InProgress), NOW), Err(Denial::PastYearReopen));
    let stale = GoalPatch { year: Some(PAST), ..status(GoalStatus::InProgress) };
    assert_eq!(check_update(PAST, stale, NOW), Err(Denial::PastYearReopen));
    let carried = GoalPatch::carry_forward(NOW);
    assert_eq!(check_update(PAST, carried.clone(), NOW), Ok(carried));
}

#[test]
fn lone_completion_note_rejected() {
    let patch = GoalPatch { completion_note: Some("late thoughts".into()), ..GoalPatch::default() };
    assert_eq!(check_update(PAST, patch, NOW), Err(Denial::PastYearNote));
}

#[test]
fn note_allowed_with_forward_move() {
    let patch = GoalPatch { completion_note: Some("carrying over".into()), ..year(NOW) };
    assert!(check_update(PAST, patch, NOW).is_ok());
}

#[test]
fn empty_patch_is_noop() {
    let out = check_update(PAST, GoalPatch::default(), NOW).unwrap();
    assert!(out.is_empty());
}

#[test]
fn denial_codes() {
    assert_eq!(Denial::PastYearBackdate.error_code(), "PAST_YEAR_EDIT");
    assert_eq!(Denial::PastYearReopen.error_code(), "PAST_YEAR_EDIT");
    assert_eq!(Denial::PastYearDelete.error_code(), "PAST_YEAR_DELETE");
}
