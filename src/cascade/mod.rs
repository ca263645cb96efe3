//! Cascade engine
//!
//! Derives recommended transitions from state changes elsewhere in the tree:
//! - vertically, child → parent (children started, children completed)
//! - vertically, parent → children (archival once the parent is terminal)
//! - laterally, sibling → sibling (dependency completion unblocks dependents)
//!
//! The engine only recommends. It never writes an artifact; applying a
//! recommendation is the caller's job, and the state machine rejects a
//! duplicate append, so asking twice is harmless.

mod children;
mod dependencies;
mod parent;
mod policy;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::error::LifecycleError;
use crate::lifecycle::EventBuilder;
use crate::models::actor::Actor;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::{ArtifactState, Event, EventMetadata, Trigger};
use crate::models::timestamp::Timestamp;

pub use children::archival_trigger;
pub use dependencies::{find_dependents, DependencyResolution};
pub use policy::{is_review_ready, CascadePolicy, CompletionThreshold};

/// Why the engine recommended a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CascadeReason {
    /// A child moved to `in_progress` while the parent had not started.
    ChildStarted,
    /// Enough children are in review or completed for the parent to be
    /// reviewed.
    ChildrenCompleted { ready: usize, total: usize },
    /// The parent reached a terminal state that closes its children.
    ParentClosed { parent_state: ArtifactState },
    /// Every blocking dependency is resolved.
    DependenciesResolved,
}

impl std::fmt::Display for CascadeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CascadeReason::ChildStarted => write!(f, "a child started work"),
            CascadeReason::ChildrenCompleted { ready, total } => {
                write!(f, "{ready} of {total} children in review or completed")
            }
            CascadeReason::ParentClosed { parent_state } => {
                write!(f, "parent is {parent_state}")
            }
            CascadeReason::DependenciesResolved => {
                write!(f, "all blocking dependencies resolved")
            }
        }
    }
}

/// Advisory transition: move some artifact to `target_state` citing `trigger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub target_state: ArtifactState,
    pub trigger: Trigger,
    pub reason: CascadeReason,
}

/// A recommendation bound to the artifact it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecommendation {
    pub artifact_id: ArtifactId,
    pub from_state: ArtifactState,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default)]
pub struct CascadeEngine {
    policy: CascadePolicy,
}

impl CascadeEngine {
    pub fn new(policy: CascadePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CascadePolicy {
        &self.policy
    }

    /// The identity stamped on every event this engine produces.
    pub fn actor(&self) -> Actor {
        Actor::system_cascade()
    }

    /// Build an event attributed to the cascade actor, timestamped now.
    pub fn generate_cascade_event(
        &self,
        target_state: ArtifactState,
        trigger: Trigger,
        metadata: Option<EventMetadata>,
    ) -> Result<Event, LifecycleError> {
        self.generate_cascade_event_at(target_state, trigger, metadata, Timestamp::now())
    }

    pub fn generate_cascade_event_at(
        &self,
        target_state: ArtifactState,
        trigger: Trigger,
        metadata: Option<EventMetadata>,
        at: Timestamp,
    ) -> Result<Event, LifecycleError> {
        let mut builder = EventBuilder::new(target_state, trigger, self.actor()).at(at);
        if let Some(metadata) = metadata {
            builder = builder.metadata(metadata);
        }
        builder.build()
    }

    /// Materialize a recommendation as a cascade event.
    pub fn event_for(
        &self,
        recommendation: &Recommendation,
        at: Timestamp,
    ) -> Result<Event, LifecycleError> {
        self.generate_cascade_event_at(recommendation.target_state, recommendation.trigger, None, at)
    }
}
