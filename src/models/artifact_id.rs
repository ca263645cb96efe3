//! Artifact identifiers
//!
//! IDs encode tree position: `A` is an initiative, `A.1` a milestone under
//! it, `A.1.1` an issue under that milestone. Ordering is hierarchical and
//! numeric, so `A.2` sorts before `A.10`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::LifecycleError;

/// Level of an artifact in the initiative → milestone → issue tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Initiative,
    Milestone,
    Issue,
}

impl ArtifactKind {
    /// Kind of the artifact directly above this one, if any.
    pub fn parent_kind(&self) -> Option<ArtifactKind> {
        match self {
            ArtifactKind::Initiative => None,
            ArtifactKind::Milestone => Some(ArtifactKind::Initiative),
            ArtifactKind::Issue => Some(ArtifactKind::Milestone),
        }
    }

    pub fn child_kind(&self) -> Option<ArtifactKind> {
        match self {
            ArtifactKind::Initiative => Some(ArtifactKind::Milestone),
            ArtifactKind::Milestone => Some(ArtifactKind::Issue),
            ArtifactKind::Issue => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Initiative => "initiative",
            ArtifactKind::Milestone => "milestone",
            ArtifactKind::Issue => "issue",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted artifact identifier.
///
/// Field order matters: the derived `Ord` compares the initiative letters
/// first, then the numeric path segment by segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId {
    initiative: String,
    path: Vec<u32>,
}

impl ArtifactId {
    pub fn parse(value: &str) -> Result<Self, LifecycleError> {
        let invalid = || LifecycleError::InvalidArtifactId {
            value: value.to_string(),
        };

        let mut segments = value.split('.');
        let initiative = segments.next().unwrap_or_default();
        if initiative.is_empty() || !initiative.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid());
        }

        let mut path = Vec::new();
        for segment in segments {
            if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let number: u32 = segment.parse().map_err(|_| invalid())?;
            if number == 0 {
                return Err(invalid());
            }
            path.push(number);
        }

        if path.len() > 2 {
            return Err(invalid());
        }

        Ok(Self {
            initiative: initiative.to_string(),
            path,
        })
    }

    pub fn kind(&self) -> ArtifactKind {
        match self.path.len() {
            0 => ArtifactKind::Initiative,
            1 => ArtifactKind::Milestone,
            _ => ArtifactKind::Issue,
        }
    }

    /// Structural depth: 0 for initiatives, 1 for milestones, 2 for issues.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn initiative(&self) -> &str {
        &self.initiative
    }

    /// Immediate parent, or `None` for initiatives.
    pub fn parent(&self) -> Option<ArtifactId> {
        if self.path.is_empty() {
            return None;
        }
        Some(Self {
            initiative: self.initiative.clone(),
            path: self.path[..self.path.len() - 1].to_vec(),
        })
    }

    /// Same kind and same immediate parent. Initiatives share the root.
    pub fn is_sibling_of(&self, other: &ArtifactId) -> bool {
        self != other && self.depth() == other.depth() && self.parent() == other.parent()
    }

    /// Whether `self` is the immediate parent of `other`.
    pub fn is_parent_of(&self, other: &ArtifactId) -> bool {
        other.parent().as_ref() == Some(self)
    }

    /// ID of the `number`-th child, if this kind has children.
    pub fn child(&self, number: u32) -> Option<ArtifactId> {
        self.kind().child_kind()?;
        let mut path = self.path.clone();
        path.push(number);
        Some(Self {
            initiative: self.initiative.clone(),
            path,
        })
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.initiative)?;
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactId {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = LifecycleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.to_string()
    }
}
