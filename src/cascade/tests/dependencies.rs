use super::{artifact_in, blocked_by, cascade_trigger_of, id, jane, ts};
use crate::cascade::{find_dependents, CascadeEngine, CascadeReason};
use crate::error::LifecycleError;
use crate::lifecycle::EventBuilder;
use crate::models::artifact::{Artifact, ArtifactSet};
use crate::models::event::{ArtifactState, BlockingDependency, Trigger};

#[test]
fn test_single_dependency_unblocks() {
    let engine = CascadeEngine::default();
    let mut dependent = blocked_by("A.1.2", &["A.1.1"], "2025-01-02T00:00:00Z");

    let resolution = engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-05T00:00:00Z"))
        .unwrap();

    assert!(resolution.all_resolved());
    assert_eq!(
        resolution.dependencies,
        vec![BlockingDependency::resolved(id("A.1.1"), ts("2025-01-05T00:00:00Z"))]
    );
    let ready = resolution.ready.clone().unwrap();
    assert_eq!(ready.target_state, ArtifactState::Ready);
    assert_eq!(ready.trigger, Trigger::DependencyCompleted);
    assert_eq!(ready.reason, CascadeReason::DependenciesResolved);

    let refresh = resolution.event.unwrap();
    assert_eq!(refresh.state(), ArtifactState::Blocked);
    assert_eq!(refresh.trigger(), Trigger::HasDependencies);
    assert!(refresh.actor().is_system());

    dependent.append_event(refresh).unwrap();
    dependent
        .append_event(engine.event_for(&ready, ts("2025-01-05T00:00:00Z")).unwrap())
        .unwrap();
    assert_eq!(dependent.current_state(), Some(ArtifactState::Ready));
    assert_eq!(cascade_trigger_of(&dependent), Trigger::DependencyCompleted);
}

#[test]
fn test_convergent_dependencies_wait_for_both() {
    let engine = CascadeEngine::default();
    let mut dependent = blocked_by("A.1.3", &["A.1.1", "A.1.2"], "2025-01-02T00:00:00Z");

    let first = engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-03T00:00:00Z"))
        .unwrap();
    assert!(first.ready.is_none());
    assert!(!first.all_resolved());
    dependent.append_event(first.event.unwrap()).unwrap();
    assert_eq!(dependent.current_state(), Some(ArtifactState::Blocked));

    let second = engine
        .resolve_dependency_completion(&dependent, &id("A.1.2"), ts("2025-01-04T00:00:00Z"))
        .unwrap();
    assert!(second.ready.is_some());
    assert!(second.all_resolved());
    assert_eq!(
        second.dependencies[0].resolved_at,
        Some(ts("2025-01-03T00:00:00Z"))
    );
}

#[test]
fn test_repeat_resolution_produces_no_event() {
    let engine = CascadeEngine::default();
    let mut dependent = blocked_by("A.1.3", &["A.1.1", "A.1.2"], "2025-01-02T00:00:00Z");

    let first = engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-03T00:00:00Z"))
        .unwrap();
    dependent.append_event(first.event.unwrap()).unwrap();

    let again = engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-09T00:00:00Z"))
        .unwrap();
    assert!(again.event.is_none());
    assert!(again.ready.is_none());
    assert_eq!(again.dependencies, first.dependencies);
}

#[test]
fn test_latest_blocked_event_is_not_rewritten() {
    let engine = CascadeEngine::default();
    let dependent = blocked_by("A.1.2", &["A.1.1"], "2025-01-02T00:00:00Z");
    let before = dependent.clone();

    engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-05T00:00:00Z"))
        .unwrap();
    assert_eq!(dependent, before);
    assert!(!dependent.latest_blocked_event().unwrap().blocking_dependencies()[0].resolved);
}

#[test]
fn test_not_blocked_is_an_error() {
    let engine = CascadeEngine::default();
    let ready = artifact_in("A.1.2", ArtifactState::Ready);
    let err = engine
        .resolve_dependency_completion(&ready, &id("A.1.1"), ts("2025-01-05T00:00:00Z"))
        .unwrap_err();
    assert_eq!(
        err,
        LifecycleError::NotBlocked {
            artifact_id: id("A.1.2"),
            state: Some(ArtifactState::Ready),
        }
    );
}

#[test]
fn test_unknown_dependency_is_an_error() {
    let engine = CascadeEngine::default();
    let dependent = blocked_by("A.1.2", &["A.1.1"], "2025-01-02T00:00:00Z");
    let err = engine
        .resolve_dependency_completion(&dependent, &id("A.1.3"), ts("2025-01-05T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::UnknownBlockingDependency { .. }));
}

#[test]
fn test_resolution_time_must_not_precede_log() {
    let engine = CascadeEngine::default();
    let mut dependent = blocked_by("A.1.2", &["A.1.1"], "2025-01-10T00:00:00Z");
    let resolution = engine
        .resolve_dependency_completion(&dependent, &id("A.1.1"), ts("2025-01-05T00:00:00Z"))
        .unwrap();
    let err = dependent.append_event(resolution.event.unwrap()).unwrap_err();
    assert!(matches!(err, LifecycleError::EventOrderInvalid { .. }));
}

#[test]
fn test_find_dependents_by_blocked_by() {
    let mut a2 = Artifact::new_at(id("A.1.2"), "two", jane(), ts("2025-01-01T00:00:00Z"));
    a2.add_blocked_by(id("A.1.1"));
    let mut a3 = Artifact::new_at(id("A.1.3"), "three", jane(), ts("2025-01-01T00:00:00Z"));
    a3.add_blocked_by(id("A.1.1"));
    a3.add_blocked_by(id("A.1.2"));
    let a1 = Artifact::new_at(id("A.1.1"), "one", jane(), ts("2025-01-01T00:00:00Z"));

    let artifacts: ArtifactSet = vec![a3, a1, a2].into_iter().collect();
    let dependents: Vec<String> = find_dependents(&artifacts, &id("A.1.1"))
        .iter()
        .map(|a| a.id.to_string())
        .collect();
    assert_eq!(dependents, vec!["A.1.2", "A.1.3"]);
    assert!(find_dependents(&artifacts, &id("A.1.3")).is_empty());
}

#[test]
fn test_cascade_event_uses_system_actor() {
    let engine = CascadeEngine::default();
    let event = engine
        .generate_cascade_event(ArtifactState::InReview, Trigger::ChildrenCompleted, None)
        .unwrap();
    assert_eq!(event.actor().to_string(), "System Cascade (cascade@system)");

    let err = engine
        .generate_cascade_event(ArtifactState::InReview, Trigger::PrMerged, None)
        .unwrap_err();
    assert!(matches!(err, LifecycleError::TriggerMismatch { .. }));
}

#[test]
fn test_blocked_cascade_event_requires_list() {
    let err = CascadeEngine::default()
        .generate_cascade_event(ArtifactState::Blocked, Trigger::HasDependencies, None)
        .unwrap_err();
    assert_eq!(err, LifecycleError::MissingBlockingDependencies);

    // manual blocked events go through the same check
    assert!(EventBuilder::blocked(jane(), Vec::new()).build().is_err());
}

#[test]
fn test_missing_blocking_list_is_seeded_from_blocked_by() {
    use crate::models::event::Event;

    let mut dependent = Artifact::new_at(id("A.1.3"), "three", jane(), ts("2025-01-01T00:00:00Z"));
    dependent.add_blocked_by(id("A.1.1"));
    dependent.add_blocked_by(id("A.1.2"));
    // hand-edited log: blocked without a list
    dependent
        .append_event(Event::from_parts(
            ArtifactState::Blocked,
            ts("2025-01-02T00:00:00Z"),
            jane(),
            Trigger::HasDependencies,
            None,
        ))
        .unwrap();

    let resolution = CascadeEngine::default()
        .resolve_dependency_completion(&dependent, &id("A.1.2"), ts("2025-01-03T00:00:00Z"))
        .unwrap();
    assert_eq!(
        resolution.dependencies,
        vec![
            BlockingDependency::pending(id("A.1.1")),
            BlockingDependency::resolved(id("A.1.2"), ts("2025-01-03T00:00:00Z")),
        ]
    );
    assert!(resolution.event.is_some());
    assert!(resolution.ready.is_none());
}
