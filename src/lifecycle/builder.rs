//! Event construction
//!
//! Every event names its trigger explicitly. Nothing here infers a trigger
//! from the state; the per-state constructors bind the canonical trigger up
//! front and `build` re-checks the pair regardless.

use std::collections::HashSet;

use crate::error::LifecycleError;
use crate::models::actor::Actor;
use crate::models::event::{ArtifactState, BlockingDependency, Event, EventMetadata, Trigger};
use crate::models::timestamp::Timestamp;

use super::state_machine::{canonical_trigger, ensure_trigger_valid};

/// Build and validate a single event.
pub fn create_event(
    state: ArtifactState,
    actor: Actor,
    trigger: Trigger,
    timestamp: Option<Timestamp>,
    metadata: Option<EventMetadata>,
) -> Result<Event, LifecycleError> {
    let mut builder = EventBuilder::new(state, trigger, actor);
    if let Some(ts) = timestamp {
        builder = builder.at(ts);
    }
    if let Some(metadata) = metadata {
        builder = builder.metadata(metadata);
    }
    builder.build()
}

#[derive(Debug, Clone)]
pub struct EventBuilder {
    state: ArtifactState,
    trigger: Trigger,
    actor: Actor,
    timestamp: Option<Timestamp>,
    metadata: Option<EventMetadata>,
}

impl EventBuilder {
    pub fn new(state: ArtifactState, trigger: Trigger, actor: Actor) -> Self {
        Self {
            state,
            trigger,
            actor,
            timestamp: None,
            metadata: None,
        }
    }

    fn canonical(state: ArtifactState, actor: Actor) -> Self {
        Self::new(state, canonical_trigger(state), actor)
    }

    pub fn draft(actor: Actor) -> Self {
        Self::canonical(ArtifactState::Draft, actor)
    }

    pub fn ready(actor: Actor) -> Self {
        Self::canonical(ArtifactState::Ready, actor)
    }

    /// `blocked` carries its blocking list; `build` rejects an empty one.
    pub fn blocked(actor: Actor, dependencies: Vec<BlockingDependency>) -> Self {
        Self::canonical(ArtifactState::Blocked, actor)
            .metadata(EventMetadata::with_blocking(dependencies))
    }

    pub fn in_progress(actor: Actor) -> Self {
        Self::canonical(ArtifactState::InProgress, actor)
    }

    pub fn in_review(actor: Actor) -> Self {
        Self::canonical(ArtifactState::InReview, actor)
    }

    pub fn completed(actor: Actor) -> Self {
        Self::canonical(ArtifactState::Completed, actor)
    }

    pub fn cancelled(actor: Actor) -> Self {
        Self::canonical(ArtifactState::Cancelled, actor)
    }

    pub fn archived(actor: Actor) -> Self {
        Self::canonical(ArtifactState::Archived, actor)
    }

    /// Override the bound trigger. `build` still checks it against the state.
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn build(self) -> Result<Event, LifecycleError> {
        ensure_trigger_valid(self.state, self.trigger)?;

        if self.state == ArtifactState::Blocked {
            let dependencies = self
                .metadata
                .as_ref()
                .map(|m| m.blocking_dependencies.as_slice())
                .unwrap_or_default();
            validate_blocking_dependencies(dependencies)?;
        }

        Ok(Event::from_parts(
            self.state,
            self.timestamp.unwrap_or_else(Timestamp::now),
            self.actor,
            self.trigger,
            self.metadata,
        ))
    }
}

fn validate_blocking_dependencies(
    dependencies: &[BlockingDependency],
) -> Result<(), LifecycleError> {
    if dependencies.is_empty() {
        return Err(LifecycleError::MissingBlockingDependencies);
    }

    let mut seen = HashSet::new();
    for dep in dependencies {
        if !seen.insert(&dep.artifact_id) {
            return Err(LifecycleError::InconsistentBlockingDependency {
                artifact_id: dep.artifact_id.clone(),
                reason: "listed more than once".to_string(),
            });
        }
        if dep.resolved_at.is_some() && !dep.resolved {
            return Err(LifecycleError::InconsistentBlockingDependency {
                artifact_id: dep.artifact_id.clone(),
                reason: "has resolved_at but is not marked resolved".to_string(),
            });
        }
    }

    Ok(())
}
