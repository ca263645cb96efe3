//! Structured errors raised by the lifecycle engine
//!
//! Every variant carries the identifying data a caller needs to render a fix
//! (states, triggers, indices, ids) and maps to a stable machine-readable
//! [`ErrorCode`]. Nothing here formats for a terminal.

use thiserror::Error;

use crate::models::artifact_id::{ArtifactId, ArtifactKind};
use crate::models::event::{ArtifactState, Trigger};
use crate::models::timestamp::Timestamp;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EventTriggerMismatch,
    InvalidStateTransition,
    EventOrderInvalid,
    BlockedWithoutDependencies,
    InconsistentBlockingDependency,
    InvalidTimestamp,
    InvalidArtifactId,
    InvalidActor,
    ArtifactNotBlocked,
    UnknownBlockingDependency,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EventTriggerMismatch => "EVENT_TRIGGER_MISMATCH",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::EventOrderInvalid => "EVENT_ORDER_INVALID",
            ErrorCode::BlockedWithoutDependencies => "BLOCKED_WITHOUT_DEPENDENCIES",
            ErrorCode::InconsistentBlockingDependency => "INCONSISTENT_BLOCKING_DEPENDENCY",
            ErrorCode::InvalidTimestamp => "INVALID_TIMESTAMP",
            ErrorCode::InvalidArtifactId => "INVALID_ARTIFACT_ID",
            ErrorCode::InvalidActor => "INVALID_ACTOR",
            ErrorCode::ArtifactNotBlocked => "ARTIFACT_NOT_BLOCKED",
            ErrorCode::UnknownBlockingDependency => "UNKNOWN_BLOCKING_DEPENDENCY",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an event log failed ordering validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderViolation {
    /// The log has no events at all.
    EmptyLog,
    /// The first event is not the `draft` creation event.
    FirstEventNotCreation {
        state: ArtifactState,
        trigger: Trigger,
    },
    /// A creation event appears after the first position.
    DuplicateCreation,
    /// A timestamp is earlier than the one before it.
    TimestampRegression {
        previous: Timestamp,
        current: Timestamp,
    },
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderViolation::EmptyLog => write!(f, "event log is empty"),
            OrderViolation::FirstEventNotCreation { state, trigger } => write!(
                f,
                "first event must be draft/{}, found {state}/{trigger}",
                Trigger::ArtifactCreated
            ),
            OrderViolation::DuplicateCreation => {
                write!(f, "creation event may only appear first")
            }
            OrderViolation::TimestampRegression { previous, current } => write!(
                f,
                "timestamp {current} is earlier than preceding {previous}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("trigger '{trigger}' is not valid for state '{state}' (allowed: {})", join_triggers(.allowed))]
    TriggerMismatch {
        state: ArtifactState,
        trigger: Trigger,
        allowed: Vec<Trigger>,
    },

    #[error("{kind} cannot transition from '{from}' to '{to}'")]
    InvalidTransition {
        kind: ArtifactKind,
        from: ArtifactState,
        to: ArtifactState,
    },

    #[error("event order invalid at index {index}: {violation}")]
    EventOrderInvalid {
        index: usize,
        violation: OrderViolation,
    },

    #[error("blocked event requires at least one blocking dependency")]
    MissingBlockingDependencies,

    #[error("blocking dependency '{artifact_id}': {reason}")]
    InconsistentBlockingDependency {
        artifact_id: ArtifactId,
        reason: String,
    },

    #[error("invalid timestamp '{value}': expected UTC in YYYY-MM-DDTHH:MM:SSZ form")]
    InvalidTimestamp { value: String },

    #[error("invalid artifact id '{value}': expected A, A.1 or A.1.1 form")]
    InvalidArtifactId { value: String },

    #[error("invalid actor '{value}': expected 'Name (email)'")]
    InvalidActor { value: String },

    #[error("artifact '{artifact_id}' is not blocked (current state: {})", display_state(.state))]
    NotBlocked {
        artifact_id: ArtifactId,
        state: Option<ArtifactState>,
    },

    #[error("'{dependency_id}' is not a blocking dependency of '{artifact_id}'")]
    UnknownBlockingDependency {
        artifact_id: ArtifactId,
        dependency_id: ArtifactId,
    },
}

impl LifecycleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LifecycleError::TriggerMismatch { .. } => ErrorCode::EventTriggerMismatch,
            LifecycleError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            LifecycleError::EventOrderInvalid { .. } => ErrorCode::EventOrderInvalid,
            LifecycleError::MissingBlockingDependencies => ErrorCode::BlockedWithoutDependencies,
            LifecycleError::InconsistentBlockingDependency { .. } => {
                ErrorCode::InconsistentBlockingDependency
            }
            LifecycleError::InvalidTimestamp { .. } => ErrorCode::InvalidTimestamp,
            LifecycleError::InvalidArtifactId { .. } => ErrorCode::InvalidArtifactId,
            LifecycleError::InvalidActor { .. } => ErrorCode::InvalidActor,
            LifecycleError::NotBlocked { .. } => ErrorCode::ArtifactNotBlocked,
            LifecycleError::UnknownBlockingDependency { .. } => {
                ErrorCode::UnknownBlockingDependency
            }
        }
    }
}

fn display_state(state: &Option<ArtifactState>) -> String {
    state.map_or_else(|| "none".to_string(), |s| s.to_string())
}

fn join_triggers(triggers: &[Trigger]) -> String {
    triggers
        .iter()
        .map(Trigger::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
