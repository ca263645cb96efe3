use super::{artifact_in, id};
use crate::cascade::{archival_trigger, CascadeEngine, CascadeReason};
use crate::models::artifact::ArtifactSet;
use crate::models::event::{ArtifactState, Trigger};

use ArtifactState::*;

#[test]
fn test_archival_trigger_follows_parent_state() {
    assert_eq!(archival_trigger(Completed), Some(Trigger::ParentCompleted));
    assert_eq!(archival_trigger(Archived), Some(Trigger::ParentArchived));
    for state in [Draft, Ready, Blocked, InProgress, InReview, Cancelled] {
        assert_eq!(archival_trigger(state), None, "{state}");
    }
}

#[test]
fn test_open_children_are_archived() {
    let engine = CascadeEngine::default();
    for child_state in [Draft, Ready, Blocked, InProgress, InReview] {
        let rec = engine.should_archive_child(Completed, child_state).unwrap();
        assert_eq!(rec.target_state, Archived);
        assert_eq!(rec.trigger, Trigger::ParentCompleted);
        assert_eq!(
            rec.reason,
            CascadeReason::ParentClosed {
                parent_state: Completed
            }
        );
    }
}

#[test]
fn test_settled_children_are_left_alone() {
    let engine = CascadeEngine::default();
    for child_state in [Completed, Cancelled, Archived] {
        assert!(engine.should_archive_child(Archived, child_state).is_none());
    }
}

#[test]
fn test_cascade_to_children_skips_settled() {
    let artifacts: ArtifactSet = vec![
        artifact_in("A", Archived),
        artifact_in("A.1", InProgress),
        artifact_in("A.2", Completed),
        artifact_in("A.3", Draft),
        // grandchild: not a direct child of A
        artifact_in("A.1.1", Ready),
    ]
    .into_iter()
    .collect();

    let parent = artifacts.get(&id("A")).unwrap();
    let recs = CascadeEngine::default().cascade_to_children(parent, &artifacts);

    let ids: Vec<String> = recs.iter().map(|r| r.artifact_id.to_string()).collect();
    assert_eq!(ids, vec!["A.1", "A.3"]);
    assert!(recs
        .iter()
        .all(|r| r.recommendation.trigger == Trigger::ParentArchived));
    assert_eq!(recs[0].from_state, InProgress);
}

#[test]
fn test_open_parent_cascades_nothing() {
    let artifacts: ArtifactSet = vec![artifact_in("A.1", InProgress), artifact_in("A.1.1", Ready)]
        .into_iter()
        .collect();
    let parent = artifacts.get(&id("A.1")).unwrap();
    assert!(CascadeEngine::default()
        .cascade_to_children(parent, &artifacts)
        .is_empty());
}

#[test]
fn test_archival_event_is_appendable() {
    let engine = CascadeEngine::default();
    let mut child = artifact_in("A.1.1", InProgress);
    let rec = engine.should_archive_child(Completed, InProgress).unwrap();
    let event = engine
        .event_for(&rec, super::ts("2025-02-01T00:00:00Z"))
        .unwrap();

    assert!(event.actor().is_system());
    child.append_event(event).unwrap();
    assert_eq!(child.current_state(), Some(Archived));
    assert_eq!(super::cascade_trigger_of(&child), Trigger::ParentCompleted);
}
