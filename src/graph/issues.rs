//! Issue records produced by the dependency graph checks

use serde::Serialize;

use crate::models::artifact::RelationshipField;
use crate::models::artifact_id::{ArtifactId, ArtifactKind};

/// Machine-readable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    CircularDependency,
    CrossLevelDependency,
    RelationshipUnknownArtifact,
    RelationshipInconsistentPair,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::CircularDependency => "CIRCULAR_DEPENDENCY",
            IssueCode::CrossLevelDependency => "CROSS_LEVEL_DEPENDENCY",
            IssueCode::RelationshipUnknownArtifact => "RELATIONSHIP_UNKNOWN_ARTIFACT",
            IssueCode::RelationshipInconsistentPair => "RELATIONSHIP_INCONSISTENT_PAIR",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Why a reference failed the same-level, same-parent rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossLevelReason {
    DifferentLevel,
    DifferentParent,
}

/// Structured data behind an issue, enough to drive an automated fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueDetail {
    Cycle {
        path: Vec<ArtifactId>,
    },
    CrossLevel {
        field: RelationshipField,
        target: ArtifactId,
        source_kind: ArtifactKind,
        target_kind: ArtifactKind,
        reason: CrossLevelReason,
    },
    UnknownArtifact {
        field: RelationshipField,
        target: ArtifactId,
    },
    InconsistentPair {
        field: RelationshipField,
        target: ArtifactId,
        missing_field: RelationshipField,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub artifact_id: ArtifactId,
    pub message: String,
    pub detail: IssueDetail,
}

impl DependencyIssue {
    pub fn cycle(path: Vec<ArtifactId>) -> Self {
        let rendered = path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");
        Self {
            code: IssueCode::CircularDependency,
            severity: Severity::Error,
            artifact_id: path[0].clone(),
            message: format!("Circular dependency detected: {rendered}"),
            detail: IssueDetail::Cycle { path },
        }
    }

    pub fn cross_level(
        source: &ArtifactId,
        field: RelationshipField,
        target: &ArtifactId,
        reason: CrossLevelReason,
    ) -> Self {
        let message = match reason {
            CrossLevelReason::DifferentLevel => format!(
                "{} {source} cannot reference {} {target} in {field}: dependencies must be between artifacts of the same level",
                source.kind(),
                target.kind()
            ),
            CrossLevelReason::DifferentParent => format!(
                "{} {source} cannot reference {} {target} in {field}: dependencies must share the same parent",
                source.kind(),
                target.kind()
            ),
        };
        Self {
            code: IssueCode::CrossLevelDependency,
            severity: Severity::Error,
            artifact_id: source.clone(),
            message,
            detail: IssueDetail::CrossLevel {
                field,
                target: target.clone(),
                source_kind: source.kind(),
                target_kind: target.kind(),
                reason,
            },
        }
    }

    pub fn unknown_artifact(
        source: &ArtifactId,
        field: RelationshipField,
        target: &ArtifactId,
    ) -> Self {
        Self {
            code: IssueCode::RelationshipUnknownArtifact,
            severity: Severity::Warning,
            artifact_id: source.clone(),
            message: format!("{source} lists {target} in {field}, but {target} was not found"),
            detail: IssueDetail::UnknownArtifact {
                field,
                target: target.clone(),
            },
        }
    }

    pub fn inconsistent_pair(
        source: &ArtifactId,
        field: RelationshipField,
        target: &ArtifactId,
    ) -> Self {
        let missing_field = field.reciprocal();
        Self {
            code: IssueCode::RelationshipInconsistentPair,
            severity: Severity::Error,
            artifact_id: source.clone(),
            message: format!(
                "{source} lists {target} in {field}, but {target} does not list {source} in {missing_field}"
            ),
            detail: IssueDetail::InconsistentPair {
                field,
                target: target.clone(),
                missing_field,
            },
        }
    }

    /// Ids this issue concerns, the declaring artifact first.
    pub fn related_ids(&self) -> Vec<&ArtifactId> {
        let mut ids = vec![&self.artifact_id];
        match &self.detail {
            IssueDetail::Cycle { path } => {
                ids.extend(path.iter().filter(|id| **id != self.artifact_id));
            }
            IssueDetail::CrossLevel { target, .. }
            | IssueDetail::UnknownArtifact { target, .. }
            | IssueDetail::InconsistentPair { target, .. } => ids.push(target),
        }
        ids.dedup();
        ids
    }
}
