use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;
use washclub_core::{
    eligibility::{
        can_cancel, evaluate, EligibilityDecision, EligibilityEngine, RollingWindow,
        WindowDirection,
    },
    errors::DenialReason,
    models::{
        booking::{Booking, BookingCandidate},
        slot::TimeSlot,
    },
};

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

fn booking(user_id: &str, day: &str, slot: TimeSlot) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        date: date(day),
        slot,
        created_at: Utc::now(),
    }
}

fn today() -> NaiveDate {
    date("2025-07-01")
}

fn denied(reason: DenialReason) -> EligibilityDecision {
    EligibilityDecision::Denied { reason }
}

#[test]
fn test_first_booking_on_empty_calendar_is_allowed() {
    let candidate = BookingCandidate::new("u1", date("2025-07-11"), TimeSlot::Morning);

    assert_eq!(evaluate(&candidate, &[], today()), EligibilityDecision::Allowed);
}

#[test]
fn test_slot_held_by_another_user_is_taken() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u2", date("2025-07-11"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &existing, today()),
        denied(DenialReason::SlotTaken)
    );
}

#[test]
fn test_other_slot_same_day_is_free_for_another_user() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u2", date("2025-07-11"), TimeSlot::Afternoon);

    assert!(evaluate(&candidate, &existing, today()).is_allowed());
}

#[test]
fn test_next_week_conflicts_with_own_booking() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Midday);

    assert_eq!(
        evaluate(&candidate, &existing, today()),
        denied(DenialReason::WindowConflict {
            eligible_after: date("2025-08-02"),
        })
    );
}

#[test]
fn test_four_weeks_later_is_allowed() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-08-08"), TimeSlot::Morning);

    assert!(evaluate(&candidate, &existing, today()).is_allowed());
}

#[test]
fn test_exactly_three_weeks_later_is_still_inside_window() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-08-01"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &existing, today()).reason(),
        Some(DenialReason::WindowConflict {
            eligible_after: date("2025-08-02"),
        })
    );
}

#[rstest]
#[case("2025-07-12")]
#[case("2025-07-13")]
#[case("2025-07-14")]
#[case("2025-07-10")]
fn test_non_friday_is_wrong_weekday(#[case] day: &str) {
    let candidate = BookingCandidate::new("u1", date(day), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &[], today()),
        denied(DenialReason::WrongWeekday)
    );
}

#[test]
fn test_past_friday_is_denied() {
    let candidate = BookingCandidate::new("u1", date("2025-06-27"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &[], today()),
        denied(DenialReason::Past)
    );
}

#[test]
fn test_booking_for_today_is_allowed() {
    let friday = date("2025-07-04");
    let candidate = BookingCandidate::new("u1", friday, TimeSlot::Afternoon);

    assert!(evaluate(&candidate, &[], friday).is_allowed());
}

#[test]
fn test_weekday_is_checked_before_past() {
    // A past Saturday reports the weekday problem
    let candidate = BookingCandidate::new("u1", date("2025-06-28"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &[], today()),
        denied(DenialReason::WrongWeekday)
    );
}

#[test]
fn test_slot_is_checked_before_window() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-07-11"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &existing, today()),
        denied(DenialReason::SlotTaken)
    );
}

#[rstest]
#[case(0, true)]
#[case(7, true)]
#[case(14, true)]
#[case(21, true)]
#[case(-21, true)]
#[case(22, false)]
#[case(-22, false)]
#[case(28, false)]
#[case(-28, false)]
fn test_symmetric_window_bounds(#[case] offset: i64, #[case] blocked: bool) {
    let window = RollingWindow::club_rule();
    let existing = date("2025-07-11");
    let candidate = existing + chrono::Duration::days(offset);

    assert_eq!(window.blocks(existing, candidate), blocked);
}

#[rstest]
#[case(0, true)]
#[case(21, true)]
#[case(22, false)]
#[case(-7, false)]
#[case(-21, false)]
fn test_trailing_window_only_looks_back(#[case] offset: i64, #[case] blocked: bool) {
    let window = RollingWindow::new(21, WindowDirection::TrailingOnly);
    let existing = date("2025-07-11");
    let candidate = existing + chrono::Duration::days(offset);

    assert_eq!(window.blocks(existing, candidate), blocked);
}

#[test]
fn test_earlier_candidate_conflicts_with_later_booking() {
    let existing = vec![booking("u1", "2025-08-01", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Morning);

    assert_eq!(
        evaluate(&candidate, &existing, today()).reason(),
        Some(DenialReason::WindowConflict {
            eligible_after: date("2025-08-23"),
        })
    );
}

#[test]
fn test_trailing_mode_ignores_later_booking() {
    let engine = EligibilityEngine::new(RollingWindow::new(21, WindowDirection::TrailingOnly));
    let existing = vec![booking("u1", "2025-08-01", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Morning);

    assert!(engine.evaluate(&candidate, &existing, today()).is_allowed());
}

#[test]
fn test_narrow_window_allows_two_week_gap() {
    let engine = EligibilityEngine::new(RollingWindow::new(13, WindowDirection::Symmetric));
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let two_weeks = BookingCandidate::new("u1", date("2025-07-25"), TimeSlot::Morning);
    let one_week = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Morning);

    assert!(engine.evaluate(&two_weeks, &existing, today()).is_allowed());
    assert_eq!(
        engine.evaluate(&one_week, &existing, today()).reason(),
        Some(DenialReason::WindowConflict {
            eligible_after: date("2025-07-25"),
        })
    );
}

#[test]
fn test_window_ignores_other_users() {
    let existing = vec![
        booking("u2", "2025-07-11", TimeSlot::Morning),
        booking("u3", "2025-07-18", TimeSlot::Midday),
    ];
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Morning);

    assert!(evaluate(&candidate, &existing, today()).is_allowed());
}

#[test]
fn test_eligible_after_uses_nearest_booking() {
    let existing = vec![
        booking("u1", "2025-07-04", TimeSlot::Morning),
        booking("u1", "2025-08-01", TimeSlot::Morning),
    ];
    let candidate = BookingCandidate::new("u1", date("2025-07-25"), TimeSlot::Midday);

    assert_eq!(
        evaluate(&candidate, &existing, date("2025-07-01")).reason(),
        Some(DenialReason::WindowConflict {
            eligible_after: date("2025-08-23"),
        })
    );
}

#[test]
fn test_eligible_after_tie_prefers_later_booking() {
    let existing = vec![
        booking("u1", "2025-07-04", TimeSlot::Morning),
        booking("u1", "2025-07-18", TimeSlot::Morning),
    ];
    let candidate = BookingCandidate::new("u1", date("2025-07-11"), TimeSlot::Midday);

    assert_eq!(
        evaluate(&candidate, &existing, today()).reason(),
        Some(DenialReason::WindowConflict {
            eligible_after: date("2025-08-09"),
        })
    );
}

#[test]
fn test_evaluation_is_repeatable() {
    let existing = vec![booking("u1", "2025-07-11", TimeSlot::Morning)];
    let candidate = BookingCandidate::new("u1", date("2025-07-18"), TimeSlot::Midday);

    let first = evaluate(&candidate, &existing, today());
    let second = evaluate(&candidate, &existing, today());

    assert_eq!(first, second);
}

#[test]
fn test_window_bounds_and_reopening() {
    let symmetric = RollingWindow::club_rule();
    let trailing = RollingWindow::new(21, WindowDirection::TrailingOnly);
    let day = date("2025-07-11");

    assert_eq!(symmetric.bounds(day), (date("2025-06-20"), date("2025-08-01")));
    assert_eq!(trailing.bounds(day), (date("2025-06-20"), day));
    assert_eq!(symmetric.reopens_on(day), date("2025-08-02"));
    assert_eq!(RollingWindow::default(), symmetric);
}

#[rstest]
#[case("symmetric", WindowDirection::Symmetric)]
#[case("trailing", WindowDirection::TrailingOnly)]
#[case(" Trailing_Only ", WindowDirection::TrailingOnly)]
fn test_window_direction_parsing(#[case] raw: &str, #[case] expected: WindowDirection) {
    assert_eq!(raw.parse::<WindowDirection>().unwrap(), expected);
}

#[test]
fn test_unknown_window_direction_is_rejected() {
    assert!("sideways".parse::<WindowDirection>().is_err());
}

#[test]
fn test_owner_may_cancel_upcoming_booking() {
    let existing = booking("u1", "2025-07-11", TimeSlot::Morning);

    assert!(can_cancel(&existing, "u1", today()).is_allowed());
    assert!(can_cancel(&existing, "u1", date("2025-07-11")).is_allowed());
}

#[test]
fn test_cancelling_after_the_date_is_past() {
    let existing = booking("u1", "2025-07-11", TimeSlot::Morning);

    assert_eq!(
        can_cancel(&existing, "u1", date("2025-07-12")),
        denied(DenialReason::Past)
    );
}

#[test]
fn test_non_owner_cannot_cancel() {
    let existing = booking("u1", "2025-07-11", TimeSlot::Morning);

    assert_eq!(
        can_cancel(&existing, "u2", today()),
        denied(DenialReason::NotOwner)
    );
    // Ownership is reported even when the date has passed
    assert_eq!(
        can_cancel(&existing, "u2", date("2025-07-12")),
        denied(DenialReason::NotOwner)
    );
}

#[test]
fn test_decision_into_result() {
    assert_eq!(EligibilityDecision::Allowed.into_result(), Ok(()));
    assert_eq!(
        denied(DenialReason::Past).into_result(),
        Err(DenialReason::Past)
    );
}
