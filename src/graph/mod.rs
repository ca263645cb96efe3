//! Workspace-wide dependency checks
//!
//! All checks take a full snapshot and return every problem they find
//! rather than stopping at the first one.

mod consistency;
mod cycle;
mod hierarchy;
mod issues;


use serde::Serialize;

use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::ArtifactId;

pub use consistency::validate_relationship_consistency;
pub use cycle::detect_circular_dependencies;
pub use hierarchy::{sibling_violation, validate_dependency_levels};
pub use issues::{CrossLevelReason, DependencyIssue, IssueCode, IssueDetail, Severity};

/// Combined result of all dependency checks over one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub issues: Vec<DependencyIssue>,
}

impl DependencyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DependencyIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DependencyIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &DependencyIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// Issues that name `id`, as declaring artifact or as any related id.
    pub fn involving<'a>(&'a self, id: &'a ArtifactId) -> impl Iterator<Item = &'a DependencyIssue> {
        self.issues.iter().filter(move |i| i.related_ids().contains(&id))
    }
}

/// Run cycle detection, the sibling rule and the consistency check, in that
/// order.
pub fn validate_dependencies(artifacts: &ArtifactSet) -> DependencyReport {
    let mut issues = detect_circular_dependencies(artifacts);
    issues.extend(validate_dependency_levels(artifacts));
    issues.extend(validate_relationship_consistency(artifacts));
    DependencyReport { issues }
}
