use std::collections::BTreeMap;

use crate::models::artifact_id::ArtifactId;

use super::types::{Artifact, ArtifactSet};

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an artifact, returning the previous version.
    pub fn insert(&mut self, artifact: Artifact) -> Option<Artifact> {
        self.artifacts.insert(artifact.id.clone(), artifact)
    }

    pub fn get(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.get(id)
    }

    pub fn get_mut(&mut self, id: &ArtifactId) -> Option<&mut Artifact> {
        self.artifacts.get_mut(id)
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.artifacts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ArtifactId> {
        self.artifacts.keys()
    }

    /// Direct children of `parent`, in id order.
    pub fn children_of<'a>(&'a self, parent: &'a ArtifactId) -> impl Iterator<Item = &'a Artifact> {
        self.artifacts
            .values()
            .filter(move |a| parent.is_parent_of(&a.id))
    }

    /// Artifacts sharing `id`'s parent and level, excluding `id` itself.
    pub fn siblings_of<'a>(&'a self, id: &'a ArtifactId) -> impl Iterator<Item = &'a Artifact> {
        self.artifacts.values().filter(move |a| a.id.is_sibling_of(id))
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<T: IntoIterator<Item = Artifact>>(iter: T) -> Self {
        Self {
            artifacts: iter.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }
}

impl From<BTreeMap<ArtifactId, Artifact>> for ArtifactSet {
    fn from(artifacts: BTreeMap<ArtifactId, Artifact>) -> Self {
        Self { artifacts }
    }
}

impl IntoIterator for ArtifactSet {
    type Item = Artifact;
    type IntoIter = std::collections::btree_map::IntoValues<ArtifactId, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_values()
    }
}
