use crate::error::LifecycleError;
use crate::models::actor::Actor;
use crate::models::artifact_id::ArtifactId;
use crate::models::timestamp::Timestamp;

use super::types::{ArtifactState, BlockingDependency, Event, EventMetadata, Trigger};

impl Event {
    pub fn state(&self) -> ArtifactState {
        self.state
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn metadata(&self) -> Option<&EventMetadata> {
        self.metadata.as_ref()
    }

    /// Blocking list carried in metadata; empty when there is none.
    pub fn blocking_dependencies(&self) -> &[BlockingDependency] {
        self.metadata
            .as_ref()
            .map(|m| m.blocking_dependencies.as_slice())
            .unwrap_or_default()
    }

    /// Assemble an event without checking the state/trigger pair.
    ///
    /// Only the builder and tests that need deliberately broken logs use this.
    pub(crate) fn from_parts(
        state: ArtifactState,
        timestamp: Timestamp,
        actor: Actor,
        trigger: Trigger,
        metadata: Option<EventMetadata>,
    ) -> Self {
        Self {
            state,
            timestamp,
            actor,
            trigger,
            metadata,
        }
    }
}

impl BlockingDependency {
    /// Unresolved entry for a dependency.
    pub fn pending(artifact_id: ArtifactId) -> Self {
        Self {
            artifact_id,
            resolved: false,
            resolved_at: None,
        }
    }

    pub fn resolved(artifact_id: ArtifactId, at: Timestamp) -> Self {
        Self {
            artifact_id,
            resolved: true,
            resolved_at: Some(at),
        }
    }

    /// Build an entry from loosely-typed caller input, validating the id and
    /// any `resolved_at` string.
    pub fn from_descriptor(
        artifact_id: &str,
        resolved: Option<bool>,
        resolved_at: Option<&str>,
    ) -> Result<Self, LifecycleError> {
        let artifact_id = ArtifactId::parse(artifact_id)?;
        let resolved_at = resolved_at.map(Timestamp::parse).transpose()?;
        Ok(Self {
            artifact_id,
            resolved: resolved.unwrap_or(resolved_at.is_some()),
            resolved_at,
        })
    }

    /// Mark resolved at `at`, keeping an earlier resolution time if present.
    pub fn resolve(&mut self, at: Timestamp) {
        self.resolved = true;
        if self.resolved_at.is_none() {
            self.resolved_at = Some(at);
        }
    }
}

impl EventMetadata {
    pub fn with_blocking(dependencies: Vec<BlockingDependency>) -> Self {
        Self {
            blocking_dependencies: dependencies,
            ..Self::default()
        }
    }

    /// True when every entry of a non-empty blocking list is resolved.
    pub fn all_dependencies_resolved(&self) -> bool {
        !self.blocking_dependencies.is_empty()
            && self.blocking_dependencies.iter().all(|d| d.resolved)
    }

    pub fn unresolved_dependencies(&self) -> impl Iterator<Item = &ArtifactId> {
        self.blocking_dependencies
            .iter()
            .filter(|d| !d.resolved)
            .map(|d| &d.artifact_id)
    }
}
