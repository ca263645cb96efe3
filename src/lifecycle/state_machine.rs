//! Legal (state, trigger) pairs and legal state transitions
//!
//! Stateless and side-effect free. The trigger allow-list gives every target
//! state one or more causally distinct justifications; the transition graph
//! is layered on top of it.

use crate::error::LifecycleError;
use crate::models::artifact_id::ArtifactKind;
use crate::models::event::{ArtifactState, Event, Trigger};

/// Triggers that may justify reaching `state`.
pub fn allowed_triggers(state: ArtifactState) -> &'static [Trigger] {
    match state {
        ArtifactState::Draft => &[Trigger::ArtifactCreated],
        ArtifactState::Ready => &[Trigger::DependenciesMet, Trigger::DependencyCompleted],
        ArtifactState::Blocked => &[Trigger::HasDependencies],
        ArtifactState::InProgress => &[Trigger::BranchCreated, Trigger::ChildrenStarted],
        ArtifactState::InReview => &[Trigger::PrReady, Trigger::ChildrenCompleted],
        ArtifactState::Completed => &[Trigger::PrMerged],
        ArtifactState::Cancelled => &[Trigger::ManualCancel],
        ArtifactState::Archived => &[Trigger::ParentCompleted, Trigger::ParentArchived],
    }
}

/// The trigger convenience constructors bind for `state`.
pub fn canonical_trigger(state: ArtifactState) -> Trigger {
    allowed_triggers(state)[0]
}

pub fn is_trigger_valid_for_state(state: ArtifactState, trigger: Trigger) -> bool {
    allowed_triggers(state).contains(&trigger)
}

pub fn ensure_trigger_valid(state: ArtifactState, trigger: Trigger) -> Result<(), LifecycleError> {
    if is_trigger_valid_for_state(state, trigger) {
        Ok(())
    } else {
        Err(LifecycleError::TriggerMismatch {
            state,
            trigger,
            allowed: allowed_triggers(state).to_vec(),
        })
    }
}

/// Whether `kind` may move from `from` to `to`.
///
/// Valid transitions:
/// - `Draft` -> `Ready` | `Blocked`; milestones and initiatives also `InProgress`
///   (started through their children)
/// - `Ready` -> `InProgress` | `Blocked`
/// - `Blocked` -> `Ready`
/// - `InProgress` -> `InReview`
/// - `InReview` -> `Completed`; issues also back to `InProgress`
/// - any non-terminal state -> `Cancelled` | `Archived`
/// - `Completed` | `Cancelled` -> `Archived`
/// - `Archived` is final
///
/// Same-state moves are never transitions.
pub fn can_transition(kind: ArtifactKind, from: ArtifactState, to: ArtifactState) -> bool {
    use ArtifactState::*;

    if from == to {
        return false;
    }

    match (from, to) {
        (Archived, _) => false,
        (Completed | Cancelled, Archived) => true,
        (Completed | Cancelled, _) => false,
        (_, Cancelled | Archived) => true,
        (Draft, Ready | Blocked) => true,
        (Draft, InProgress) => kind != ArtifactKind::Issue,
        (Ready, InProgress | Blocked) => true,
        (Blocked, Ready) => true,
        (InProgress, InReview) => true,
        (InReview, Completed) => true,
        (InReview, InProgress) => kind == ArtifactKind::Issue,
        _ => false,
    }
}

pub fn ensure_transition(
    kind: ArtifactKind,
    from: ArtifactState,
    to: ArtifactState,
) -> Result<(), LifecycleError> {
    if can_transition(kind, from, to) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition { kind, from, to })
    }
}

/// States reachable from `from` in one step, in declaration order.
pub fn valid_transitions(kind: ArtifactKind, from: ArtifactState) -> Vec<ArtifactState> {
    ArtifactState::ALL
        .into_iter()
        .filter(|to| can_transition(kind, from, *to))
        .collect()
}

/// A `blocked` event following a `blocked` event is a refresh of the blocking
/// list rather than a transition, provided the list actually changed.
pub fn is_metadata_refresh(previous: &Event, next: &Event) -> bool {
    previous.state() == ArtifactState::Blocked
        && next.state() == ArtifactState::Blocked
        && next.trigger() == Trigger::HasDependencies
        && !next.blocking_dependencies().is_empty()
        && previous.blocking_dependencies() != next.blocking_dependencies()
}

impl ArtifactState {
    pub fn can_transition_to(&self, kind: ArtifactKind, new_state: ArtifactState) -> bool {
        can_transition(kind, *self, new_state)
    }

    pub fn accepts_trigger(&self, trigger: Trigger) -> bool {
        is_trigger_valid_for_state(*self, trigger)
    }
}
