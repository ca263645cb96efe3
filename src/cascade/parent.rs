//! Child → parent cascade

use tracing::{debug, warn};

use crate::lifecycle::can_transition;
use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::{ArtifactId, ArtifactKind};
use crate::models::event::{ArtifactState, Trigger};

use super::{is_review_ready, ArtifactRecommendation, CascadeEngine, CascadeReason, Recommendation};

impl CascadeEngine {
    /// Decide whether a parent should move because one of its children did.
    ///
    /// `child_states` holds the current state of every child of the parent,
    /// the changed child included (with its new state).
    ///
    /// Rules:
    /// - child now `in_progress`, parent `draft`/`ready` → parent `in_progress`
    ///   (`children_started`)
    /// - child now review-ready or settled (`in_review`, `completed`,
    ///   `cancelled`, `archived`), parent `in_progress`, completion threshold
    ///   met → parent `in_review` (`children_completed`)
    ///
    /// Pure: the same inputs always give the same answer.
    pub fn should_cascade_to_parent(
        &self,
        child_state: ArtifactState,
        parent_state: ArtifactState,
        child_kind: ArtifactKind,
        child_states: &[ArtifactState],
    ) -> Option<Recommendation> {
        let parent_kind = child_kind.parent_kind()?;

        let recommendation = if child_state == ArtifactState::InProgress
            && matches!(parent_state, ArtifactState::Draft | ArtifactState::Ready)
        {
            Recommendation {
                target_state: ArtifactState::InProgress,
                trigger: Trigger::ChildrenStarted,
                reason: CascadeReason::ChildStarted,
            }
        } else if (is_review_ready(child_state) || child_state.is_terminal())
            && parent_state == ArtifactState::InProgress
            && self.policy.completion.is_met(child_states)
        {
            Recommendation {
                target_state: ArtifactState::InReview,
                trigger: Trigger::ChildrenCompleted,
                reason: CascadeReason::ChildrenCompleted {
                    ready: child_states.iter().filter(|s| is_review_ready(**s)).count(),
                    total: child_states.len(),
                },
            }
        } else {
            return None;
        };

        if !can_transition(parent_kind, parent_state, recommendation.target_state) {
            debug!(
                %parent_kind,
                %parent_state,
                target = %recommendation.target_state,
                "cascade suppressed by state machine"
            );
            return None;
        }

        Some(recommendation)
    }

    /// Look up `child_id`'s parent and siblings in `artifacts` and ask
    /// [`Self::should_cascade_to_parent`].
    ///
    /// Missing data is not fatal: an absent parent, an unknown child or an
    /// empty event log yields `None` (or is left out of the sibling count)
    /// with a warning.
    pub fn recommend_for_parent(
        &self,
        artifacts: &ArtifactSet,
        child_id: &ArtifactId,
    ) -> Option<ArtifactRecommendation> {
        let parent_id = child_id.parent()?;

        let Some(child_state) = artifacts.get(child_id).and_then(|c| c.current_state()) else {
            warn!(%child_id, "child missing from snapshot or has no events; skipping cascade");
            return None;
        };

        let Some(parent) = artifacts.get(&parent_id) else {
            warn!(%child_id, %parent_id, "parent missing from snapshot; skipping cascade");
            return None;
        };
        let Some(parent_state) = parent.current_state() else {
            warn!(%parent_id, "parent has no events; skipping cascade");
            return None;
        };

        let mut child_states = vec![child_state];
        child_states.extend(artifacts.siblings_of(child_id).filter_map(|sibling| {
            let state = sibling.current_state();
            if state.is_none() {
                warn!(sibling_id = %sibling.id, "sibling has no events; left out of cascade");
            }
            state
        }));

        let recommendation = self.should_cascade_to_parent(
            child_state,
            parent_state,
            child_id.kind(),
            &child_states,
        )?;

        debug!(
            %parent_id,
            from = %parent_state,
            to = %recommendation.target_state,
            reason = %recommendation.reason,
            "parent cascade recommended"
        );

        Some(ArtifactRecommendation {
            artifact_id: parent_id,
            from_state: parent_state,
            recommendation,
        })
    }
}
