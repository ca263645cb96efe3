use super::{jane, ts};
use crate::error::{LifecycleError, OrderViolation};
use crate::lifecycle::builder::EventBuilder;
use crate::lifecycle::order::{validate_event_history, validate_event_order};
use crate::models::artifact_id::{ArtifactId, ArtifactKind};
use crate::models::event::{ArtifactState, BlockingDependency, Event, Trigger};

fn at(builder: EventBuilder, when: &str) -> Event {
    builder.at(ts(when)).build().unwrap()
}

fn valid_log() -> Vec<Event> {
    vec![
        at(EventBuilder::draft(jane()), "2025-01-01T00:00:00Z"),
        at(EventBuilder::ready(jane()), "2025-01-02T00:00:00Z"),
        at(EventBuilder::in_progress(jane()), "2025-01-03T00:00:00Z"),
        at(EventBuilder::in_review(jane()), "2025-01-04T00:00:00Z"),
        at(EventBuilder::completed(jane()), "2025-01-05T00:00:00Z"),
    ]
}

fn assert_order_error(result: Result<(), LifecycleError>, expected_index: usize) -> OrderViolation {
    match result {
        Err(LifecycleError::EventOrderInvalid { index, violation }) => {
            assert_eq!(index, expected_index);
            violation
        }
        other => panic!("expected EVENT_ORDER_INVALID, got {other:?}"),
    }
}

#[test]
fn test_valid_log_passes() {
    assert!(validate_event_order(&valid_log()).is_ok());
    assert!(validate_event_history(ArtifactKind::Issue, &valid_log()).is_ok());
}

#[test]
fn test_empty_log_fails() {
    let violation = assert_order_error(validate_event_order(&[]), 0);
    assert_eq!(violation, OrderViolation::EmptyLog);
}

#[test]
fn test_first_event_must_be_draft() {
    let log = valid_log()[1..].to_vec();
    let violation = assert_order_error(validate_event_order(&log), 0);
    assert_eq!(
        violation,
        OrderViolation::FirstEventNotCreation {
            state: ArtifactState::Ready,
            trigger: Trigger::DependenciesMet
        }
    );
}

#[test]
fn test_appending_earlier_event_fails() {
    let mut log = valid_log();
    log.push(at(EventBuilder::archived(jane()), "2025-01-04T12:00:00Z"));
    let violation = assert_order_error(validate_event_order(&log), 5);
    assert!(matches!(violation, OrderViolation::TimestampRegression { .. }));
}

#[test]
fn test_prepending_earlier_event_fails() {
    for prepended in [
        at(EventBuilder::draft(jane()), "2024-12-31T00:00:00Z"),
        at(EventBuilder::ready(jane()), "2024-12-31T00:00:00Z"),
    ] {
        let mut log = valid_log();
        log.insert(0, prepended);
        let err = validate_event_order(&log).unwrap_err();
        assert_eq!(err.code().as_str(), "EVENT_ORDER_INVALID");
    }
}

#[test]
fn test_equal_timestamps_are_allowed() {
    let log = vec![
        at(EventBuilder::draft(jane()), "2025-01-01T00:00:00Z"),
        at(EventBuilder::ready(jane()), "2025-01-01T00:00:00Z"),
        at(EventBuilder::in_progress(jane()), "2025-01-01T00:00:00Z"),
    ];
    assert!(validate_event_order(&log).is_ok());
}

#[test]
fn test_trigger_mismatch_reported_as_legality_error() {
    let mut log = valid_log();
    log.push(Event::from_parts(
        ArtifactState::Archived,
        ts("2025-01-06T00:00:00Z"),
        jane(),
        Trigger::PrMerged,
        None,
    ));
    let err = validate_event_order(&log).unwrap_err();
    assert_eq!(err.code().as_str(), "EVENT_TRIGGER_MISMATCH");
}

#[test]
fn test_history_rejects_illegal_transition() {
    let log = vec![
        at(EventBuilder::draft(jane()), "2025-01-01T00:00:00Z"),
        at(EventBuilder::completed(jane()), "2025-01-02T00:00:00Z"),
    ];
    assert!(validate_event_order(&log).is_ok());
    let err = validate_event_history(ArtifactKind::Issue, &log).unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_STATE_TRANSITION");
}

#[test]
fn test_history_allows_blocked_refresh() {
    let dep = ArtifactId::parse("A.1.2").unwrap();
    let log = vec![
        at(EventBuilder::draft(jane()), "2025-01-01T00:00:00Z"),
        at(
            EventBuilder::blocked(jane(), vec![BlockingDependency::pending(dep.clone())]),
            "2025-01-02T00:00:00Z",
        ),
        at(
            EventBuilder::blocked(
                jane(),
                vec![BlockingDependency::resolved(dep, ts("2025-01-03T00:00:00Z"))],
            ),
            "2025-01-03T00:00:00Z",
        ),
        at(
            EventBuilder::ready(jane()).trigger(Trigger::DependencyCompleted),
            "2025-01-03T00:00:00Z",
        ),
    ];
    assert!(validate_event_history(ArtifactKind::Issue, &log).is_ok());
}

#[test]
fn test_history_rejects_identical_blocked_repeat() {
    let dep = BlockingDependency::pending(ArtifactId::parse("A.1.2").unwrap());
    let log = vec![
        at(EventBuilder::draft(jane()), "2025-01-01T00:00:00Z"),
        at(EventBuilder::blocked(jane(), vec![dep.clone()]), "2025-01-02T00:00:00Z"),
        at(EventBuilder::blocked(jane(), vec![dep]), "2025-01-03T00:00:00Z"),
    ];
    assert!(validate_event_history(ArtifactKind::Issue, &log).is_err());
}
