use crate::error::{LifecycleError, OrderViolation};
use crate::lifecycle::state_machine;
use crate::models::actor::Actor;
use crate::models::artifact_id::{ArtifactId, ArtifactKind};
use crate::models::event::{ArtifactState, Event, Trigger};
use crate::models::timestamp::Timestamp;

use super::types::{Artifact, ArtifactMetadata, Relationships, RelationshipField, SCHEMA_VERSION};

impl Artifact {
    /// Create an artifact whose log holds the single `draft` creation event.
    pub fn new(id: ArtifactId, title: impl Into<String>, creator: Actor) -> Self {
        Self::new_at(id, title, creator, Timestamp::now())
    }

    pub fn new_at(
        id: ArtifactId,
        title: impl Into<String>,
        creator: Actor,
        created_at: Timestamp,
    ) -> Self {
        let draft = Event::from_parts(
            ArtifactState::Draft,
            created_at,
            creator.clone(),
            Trigger::ArtifactCreated,
            None,
        );
        Self {
            id,
            metadata: ArtifactMetadata {
                title: title.into(),
                priority: Default::default(),
                estimation: Default::default(),
                created_by: creator.clone(),
                assignee: creator,
                schema_version: SCHEMA_VERSION.to_string(),
                relationships: Relationships::default(),
                events: vec![draft],
            },
            content: None,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.id.kind()
    }

    pub fn events(&self) -> &[Event] {
        &self.metadata.events
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.metadata.events.last()
    }

    /// Derived from the last event; `None` only for a malformed empty log.
    pub fn current_state(&self) -> Option<ArtifactState> {
        self.last_event().map(Event::state)
    }

    /// Most recent `blocked` event, if any.
    pub fn latest_blocked_event(&self) -> Option<&Event> {
        self.metadata
            .events
            .iter()
            .rev()
            .find(|e| e.state() == ArtifactState::Blocked)
    }

    /// Append an event to the log.
    ///
    /// Rejects a trigger that does not belong to the event's state, a
    /// timestamp earlier than the last event, and any transition the state
    /// machine does not allow (same-state appends included). The one
    /// same-state append allowed is a `blocked` refresh that carries a
    /// changed blocking list.
    pub fn append_event(&mut self, event: Event) -> Result<(), LifecycleError> {
        state_machine::ensure_trigger_valid(event.state(), event.trigger())?;

        let Some(last) = self.last_event() else {
            if event.state() != ArtifactState::Draft {
                return Err(LifecycleError::EventOrderInvalid {
                    index: 0,
                    violation: OrderViolation::FirstEventNotCreation {
                        state: event.state(),
                        trigger: event.trigger(),
                    },
                });
            }
            self.metadata.events.push(event);
            return Ok(());
        };

        if event.timestamp() < last.timestamp() {
            return Err(LifecycleError::EventOrderInvalid {
                index: self.metadata.events.len(),
                violation: OrderViolation::TimestampRegression {
                    previous: last.timestamp(),
                    current: event.timestamp(),
                },
            });
        }

        if !state_machine::is_metadata_refresh(last, &event) {
            state_machine::ensure_transition(self.kind(), last.state(), event.state())?;
        }

        self.metadata.events.push(event);
        Ok(())
    }

    pub fn references(&self, field: RelationshipField) -> &[ArtifactId] {
        match field {
            RelationshipField::Blocks => &self.metadata.relationships.blocks,
            RelationshipField::BlockedBy => &self.metadata.relationships.blocked_by,
        }
    }

    /// Declare that `self` is blocked by `other`. The caller is responsible
    /// for adding the reciprocal `blocks` entry on `other`.
    pub fn add_blocked_by(&mut self, other: ArtifactId) {
        if !self.metadata.relationships.blocked_by.contains(&other) {
            self.metadata.relationships.blocked_by.push(other);
        }
    }

    pub fn add_blocks(&mut self, other: ArtifactId) {
        if !self.metadata.relationships.blocks.contains(&other) {
            self.metadata.relationships.blocks.push(other);
        }
    }
}
