use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::actor::Actor;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::Event;

/// Current schema version written into new artifacts.
pub const SCHEMA_VERSION: &str = "0.2.0";

/// A tracked unit of work: initiative, milestone or issue.
///
/// There is deliberately no status field. The current state is always the
/// state of the last event in `metadata.events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub metadata: ArtifactMetadata,
    /// Kind-specific body (summary, acceptance criteria, notes). Opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub estimation: Estimation,
    pub created_by: Actor,
    pub assignee: Actor,
    pub schema_version: String,
    #[serde(default)]
    pub relationships: Relationships,
    /// Append-only. Mutated only through `Artifact::append_event`.
    pub(crate) events: Vec<Event>,
}

/// Sibling dependency edges declared by an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub blocks: Vec<ArtifactId>,
    #[serde(default)]
    pub blocked_by: Vec<ArtifactId>,
}

/// Which side of a relationship a reference was declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipField {
    Blocks,
    BlockedBy,
}

impl RelationshipField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipField::Blocks => "blocks",
            RelationshipField::BlockedBy => "blocked_by",
        }
    }

    /// The field a reciprocal entry must appear in.
    pub fn reciprocal(&self) -> RelationshipField {
        match self {
            RelationshipField::Blocks => RelationshipField::BlockedBy,
            RelationshipField::BlockedBy => RelationshipField::Blocks,
        }
    }
}

impl std::fmt::Display for RelationshipField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

/// T-shirt size estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Estimation {
    XS,
    S,
    #[default]
    M,
    L,
    XL,
}

/// Point-in-time snapshot of every loaded artifact, keyed by id.
///
/// Iteration follows hierarchical id order (`A`, `A.1`, `A.1.1`, `A.2`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactSet {
    pub(crate) artifacts: BTreeMap<ArtifactId, Artifact>,
}
