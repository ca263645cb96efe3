use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::actor::Actor;
use crate::models::artifact_id::ArtifactId;
use crate::models::timestamp::Timestamp;

/// Lifecycle state reached by an event.
///
/// Terminal states are `Completed`, `Cancelled` and `Archived`; the only
/// ways out of a terminal state are `Completed -> Archived` and
/// `Cancelled -> Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactState {
    Draft,
    Ready,
    Blocked,
    InProgress,
    InReview,
    Completed,
    Cancelled,
    Archived,
}

impl ArtifactState {
    pub const ALL: [ArtifactState; 8] = [
        ArtifactState::Draft,
        ArtifactState::Ready,
        ArtifactState::Blocked,
        ArtifactState::InProgress,
        ArtifactState::InReview,
        ArtifactState::Completed,
        ArtifactState::Cancelled,
        ArtifactState::Archived,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ArtifactState::Completed | ArtifactState::Cancelled | ArtifactState::Archived
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactState::Draft => "draft",
            ArtifactState::Ready => "ready",
            ArtifactState::Blocked => "blocked",
            ArtifactState::InProgress => "in_progress",
            ArtifactState::InReview => "in_review",
            ArtifactState::Completed => "completed",
            ArtifactState::Cancelled => "cancelled",
            ArtifactState::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown state '{s}'"))
    }
}

/// Causal justification for reaching a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    ArtifactCreated,
    DependenciesMet,
    DependencyCompleted,
    HasDependencies,
    BranchCreated,
    ChildrenStarted,
    PrReady,
    ChildrenCompleted,
    PrMerged,
    ManualCancel,
    ParentCompleted,
    ParentArchived,
}

impl Trigger {
    pub const ALL: [Trigger; 12] = [
        Trigger::ArtifactCreated,
        Trigger::DependenciesMet,
        Trigger::DependencyCompleted,
        Trigger::HasDependencies,
        Trigger::BranchCreated,
        Trigger::ChildrenStarted,
        Trigger::PrReady,
        Trigger::ChildrenCompleted,
        Trigger::PrMerged,
        Trigger::ManualCancel,
        Trigger::ParentCompleted,
        Trigger::ParentArchived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::ArtifactCreated => "artifact_created",
            Trigger::DependenciesMet => "dependencies_met",
            Trigger::DependencyCompleted => "dependency_completed",
            Trigger::HasDependencies => "has_dependencies",
            Trigger::BranchCreated => "branch_created",
            Trigger::ChildrenStarted => "children_started",
            Trigger::PrReady => "pr_ready",
            Trigger::ChildrenCompleted => "children_completed",
            Trigger::PrMerged => "pr_merged",
            Trigger::ManualCancel => "manual_cancel",
            Trigger::ParentCompleted => "parent_completed",
            Trigger::ParentArchived => "parent_archived",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Trigger::ALL
            .into_iter()
            .find(|trigger| trigger.as_str() == s)
            .ok_or_else(|| format!("unknown trigger '{s}'"))
    }
}

/// One entry of the blocking list carried by a `blocked` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingDependency {
    pub artifact_id: ArtifactId,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<Timestamp>,
}

/// Free-form event metadata.
///
/// The blocking list is the only structured field; anything else a caller
/// attaches is preserved verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocking_dependencies: Vec<BlockingDependency>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Immutable record of a state transition.
///
/// Fields are private: events come from the builder (which checks the
/// state/trigger pair) or from deserializing an existing log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub(crate) state: ArtifactState,
    pub(crate) timestamp: Timestamp,
    pub(crate) actor: Actor,
    pub(crate) trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) metadata: Option<EventMetadata>,
}
