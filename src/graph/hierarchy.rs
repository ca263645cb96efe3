//! Same-level, same-parent enforcement for dependency references

use crate::models::artifact::{ArtifactSet, RelationshipField};
use crate::models::artifact_id::ArtifactId;

use super::issues::{CrossLevelReason, DependencyIssue};

/// Check every `blocks` and `blocked_by` reference against the sibling rule.
///
/// Milestones may only reference milestones of the same initiative, issues
/// only issues of the same milestone. Initiatives all share the root, so any
/// initiative may reference any other. Targets do not need to be loaded;
/// the rule is structural and read off the ids.
pub fn validate_dependency_levels(artifacts: &ArtifactSet) -> Vec<DependencyIssue> {
    let mut issues = Vec::new();

    for artifact in artifacts.iter() {
        for field in [RelationshipField::Blocks, RelationshipField::BlockedBy] {
            for target in artifact.references(field) {
                if let Some(reason) = sibling_violation(&artifact.id, target) {
                    issues.push(DependencyIssue::cross_level(
                        &artifact.id,
                        field,
                        target,
                        reason,
                    ));
                }
            }
        }
    }

    issues
}

/// `None` when `target` is a legal sibling reference for `source`.
pub fn sibling_violation(source: &ArtifactId, target: &ArtifactId) -> Option<CrossLevelReason> {
    if source.depth() != target.depth() {
        Some(CrossLevelReason::DifferentLevel)
    } else if source.parent() != target.parent() {
        Some(CrossLevelReason::DifferentParent)
    } else {
        None
    }
}
