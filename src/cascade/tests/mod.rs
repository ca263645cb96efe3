mod children;
mod dependencies;

use crate::lifecycle::EventBuilder;
use crate::models::actor::Actor;
use crate::models::artifact::Artifact;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::{ArtifactState, BlockingDependency, Trigger};
use crate::models::timestamp::Timestamp;

pub(super) fn jane() -> Actor {
    Actor::parse("Jane Doe (jane@example.com)").unwrap()
}

pub(super) fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub(super) fn id(s: &str) -> ArtifactId {
    ArtifactId::parse(s).unwrap()
}

/// Artifact walked along a legal path to `state`, one day per step.
pub(super) fn artifact_in(artifact_id: &str, state: ArtifactState) -> Artifact {
    let mut artifact = Artifact::new_at(id(artifact_id), artifact_id, jane(), ts("2025-01-01T00:00:00Z"));
    let kind = artifact.kind();

    let path: &[ArtifactState] = match state {
        ArtifactState::Draft => &[],
        ArtifactState::Ready => &[ArtifactState::Ready],
        ArtifactState::Blocked => &[ArtifactState::Blocked],
        ArtifactState::InProgress => &[ArtifactState::Ready, ArtifactState::InProgress],
        ArtifactState::InReview => &[
            ArtifactState::Ready,
            ArtifactState::InProgress,
            ArtifactState::InReview,
        ],
        ArtifactState::Completed => &[
            ArtifactState::Ready,
            ArtifactState::InProgress,
            ArtifactState::InReview,
            ArtifactState::Completed,
        ],
        ArtifactState::Cancelled => &[ArtifactState::Cancelled],
        ArtifactState::Archived => &[ArtifactState::Archived],
    };

    for (day, step) in path.iter().enumerate() {
        let at = ts(&format!("2025-01-{:02}T00:00:00Z", day + 2));
        let builder = match step {
            ArtifactState::Ready => EventBuilder::ready(jane()),
            ArtifactState::Blocked => EventBuilder::blocked(
                jane(),
                vec![BlockingDependency::pending(sibling_of(&artifact.id))],
            ),
            ArtifactState::InProgress => EventBuilder::in_progress(jane()),
            ArtifactState::InReview => EventBuilder::in_review(jane()),
            ArtifactState::Completed => EventBuilder::completed(jane()),
            ArtifactState::Cancelled => EventBuilder::cancelled(jane()),
            ArtifactState::Archived => EventBuilder::archived(jane()),
            ArtifactState::Draft => unreachable!(),
        };
        artifact.append_event(builder.at(at).build().unwrap()).unwrap();
    }
    assert_eq!(artifact.current_state(), Some(state), "kind {kind}");
    artifact
}

/// Some other id at the same level, for filler blocking lists.
fn sibling_of(artifact_id: &ArtifactId) -> ArtifactId {
    match artifact_id.parent() {
        Some(parent) => parent.child(99).unwrap(),
        None => id("ZZ"),
    }
}

pub(super) fn blocked_by(artifact_id: &str, deps: &[&str], at: &str) -> Artifact {
    let mut artifact = Artifact::new_at(id(artifact_id), artifact_id, jane(), ts("2025-01-01T00:00:00Z"));
    for dep in deps {
        artifact.add_blocked_by(id(dep));
    }
    let list = deps.iter().map(|d| BlockingDependency::pending(id(d))).collect();
    artifact
        .append_event(EventBuilder::blocked(jane(), list).at(ts(at)).build().unwrap())
        .unwrap();
    artifact
}

pub(super) fn cascade_trigger_of(artifact: &Artifact) -> Trigger {
    artifact.last_event().unwrap().trigger()
}
