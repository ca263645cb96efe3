//! Parent → children archival

use tracing::{debug, warn};

use crate::models::artifact::{Artifact, ArtifactSet};
use crate::models::event::{ArtifactState, Trigger};

use super::{ArtifactRecommendation, CascadeEngine, CascadeReason, Recommendation};

/// Archival trigger implied by a parent's state, if it closes its children.
pub fn archival_trigger(parent_state: ArtifactState) -> Option<Trigger> {
    match parent_state {
        ArtifactState::Completed => Some(Trigger::ParentCompleted),
        ArtifactState::Archived => Some(Trigger::ParentArchived),
        _ => None,
    }
}

impl CascadeEngine {
    /// Whether a child in `child_state` should be archived because its parent
    /// reached `parent_state`. Only non-terminal children are archived.
    pub fn should_archive_child(
        &self,
        parent_state: ArtifactState,
        child_state: ArtifactState,
    ) -> Option<Recommendation> {
        let trigger = archival_trigger(parent_state)?;
        if child_state.is_terminal() {
            return None;
        }
        Some(Recommendation {
            target_state: ArtifactState::Archived,
            trigger,
            reason: CascadeReason::ParentClosed { parent_state },
        })
    }

    /// Archival recommendations for every open child of `parent`.
    pub fn cascade_to_children(
        &self,
        parent: &Artifact,
        artifacts: &ArtifactSet,
    ) -> Vec<ArtifactRecommendation> {
        let Some(parent_state) = parent.current_state() else {
            warn!(parent_id = %parent.id, "parent has no events; skipping child archival");
            return Vec::new();
        };
        if archival_trigger(parent_state).is_none() {
            return Vec::new();
        }

        let mut recommendations = Vec::new();
        for child in artifacts.children_of(&parent.id) {
            let Some(child_state) = child.current_state() else {
                warn!(child_id = %child.id, "child has no events; skipping archival");
                continue;
            };
            if let Some(recommendation) = self.should_archive_child(parent_state, child_state) {
                debug!(child_id = %child.id, from = %child_state, "child archival recommended");
                recommendations.push(ArtifactRecommendation {
                    artifact_id: child.id.clone(),
                    from_state: child_state,
                    recommendation,
                });
            }
        }
        recommendations
    }
}
