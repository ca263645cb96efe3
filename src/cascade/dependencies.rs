//! Lateral dependency resolution between siblings

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LifecycleError;
use crate::models::artifact::{Artifact, ArtifactSet};
use crate::models::artifact_id::ArtifactId;
use crate::models::event::{ArtifactState, BlockingDependency, Event, Trigger};
use crate::models::timestamp::Timestamp;

use super::{CascadeEngine, CascadeReason, Recommendation};

/// Outcome of recording one completed dependency on a blocked artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyResolution {
    /// The full blocking list after the update.
    pub dependencies: Vec<BlockingDependency>,
    /// `blocked` refresh event carrying the updated list. `None` when the
    /// dependency was already marked resolved and nothing changed.
    pub event: Option<Event>,
    /// Present once every blocking dependency is resolved.
    pub ready: Option<Recommendation>,
}

impl DependencyResolution {
    pub fn all_resolved(&self) -> bool {
        !self.dependencies.is_empty() && self.dependencies.iter().all(|d| d.resolved)
    }
}

impl CascadeEngine {
    /// Record that `completed_id` finished, on the blocked artifact `dependent`.
    ///
    /// The latest `blocked` event is never rewritten. The updated list goes
    /// into a new `blocked` refresh event for the caller to append. When the
    /// list is fully resolved, a `ready` recommendation with trigger
    /// `dependency_completed` is returned as well.
    ///
    /// Never touches the dependent's parent or other siblings.
    pub fn resolve_dependency_completion(
        &self,
        dependent: &Artifact,
        completed_id: &ArtifactId,
        at: Timestamp,
    ) -> Result<DependencyResolution, LifecycleError> {
        let state = dependent.current_state();
        let blocked_event = match (state, dependent.latest_blocked_event()) {
            (Some(ArtifactState::Blocked), Some(event)) => event,
            _ => {
                return Err(LifecycleError::NotBlocked {
                    artifact_id: dependent.id.clone(),
                    state,
                })
            }
        };

        let mut dependencies = blocked_event.blocking_dependencies().to_vec();
        if dependencies.is_empty() {
            warn!(
                artifact_id = %dependent.id,
                "blocked event has no blocking list; seeding it from blocked_by"
            );
            dependencies = dependent
                .metadata
                .relationships
                .blocked_by
                .iter()
                .cloned()
                .map(BlockingDependency::pending)
                .collect();
        }

        let entry = dependencies
            .iter_mut()
            .find(|d| &d.artifact_id == completed_id)
            .ok_or_else(|| LifecycleError::UnknownBlockingDependency {
                artifact_id: dependent.id.clone(),
                dependency_id: completed_id.clone(),
            })?;
        entry.resolve(at);

        let event = if blocked_event.blocking_dependencies() != dependencies.as_slice() {
            let mut metadata = blocked_event.metadata().cloned().unwrap_or_default();
            metadata.blocking_dependencies = dependencies.clone();
            Some(self.generate_cascade_event_at(
                ArtifactState::Blocked,
                Trigger::HasDependencies,
                Some(metadata),
                at,
            )?)
        } else {
            None
        };

        let all_resolved = dependencies.iter().all(|d| d.resolved);
        let ready = all_resolved.then_some(Recommendation {
            target_state: ArtifactState::Ready,
            trigger: Trigger::DependencyCompleted,
            reason: CascadeReason::DependenciesResolved,
        });

        debug!(
            artifact_id = %dependent.id,
            %completed_id,
            unresolved = dependencies.iter().filter(|d| !d.resolved).count(),
            "dependency resolved"
        );

        Ok(DependencyResolution {
            dependencies,
            event,
            ready,
        })
    }
}

/// Artifacts whose `blocked_by` names `completed_id`, in id order.
pub fn find_dependents<'a>(artifacts: &'a ArtifactSet, completed_id: &ArtifactId) -> Vec<&'a Artifact> {
    artifacts
        .iter()
        .filter(|a| a.metadata.relationships.blocked_by.contains(completed_id))
        .collect()
}
