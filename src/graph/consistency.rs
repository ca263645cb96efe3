//! Bidirectional consistency of `blocks` / `blocked_by`

use crate::models::artifact::{ArtifactSet, RelationshipField};

use super::issues::DependencyIssue;

/// For every declared edge A→B, check that B exists and lists A on the
/// reciprocal side.
///
/// A missing target and a missing reciprocal entry are reported under
/// different codes; the fixes differ (create the artifact vs. add the
/// entry). A one-sided pair is reported once, on the side that declares it.
pub fn validate_relationship_consistency(artifacts: &ArtifactSet) -> Vec<DependencyIssue> {
    let mut issues = Vec::new();

    for artifact in artifacts.iter() {
        for field in [RelationshipField::Blocks, RelationshipField::BlockedBy] {
            for target_id in artifact.references(field) {
                let Some(target) = artifacts.get(target_id) else {
                    issues.push(DependencyIssue::unknown_artifact(
                        &artifact.id,
                        field,
                        target_id,
                    ));
                    continue;
                };

                if !target.references(field.reciprocal()).contains(&artifact.id) {
                    issues.push(DependencyIssue::inconsistent_pair(
                        &artifact.id,
                        field,
                        target_id,
                    ));
                }
            }
        }
    }

    issues
}
