//! Artifact persistence
//!
//! The lifecycle and cascade code never touches storage; the CLI commands go
//! through [`ArtifactStore`] so they can run against the YAML tree or an
//! in-memory map alike.

use anyhow::{bail, Context, Result};
use glob::glob;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::artifact::{Artifact, ArtifactSet};
use crate::models::artifact_id::{ArtifactId, ArtifactKind};

use super::locking::{locked_read, locked_update, locked_write};

pub trait ArtifactStore {
    /// Snapshot of every artifact the store can read.
    fn load_all(&self) -> Result<ArtifactSet>;

    fn load(&self, id: &ArtifactId) -> Result<Artifact>;

    fn save(&self, artifact: &Artifact) -> Result<()>;

    /// Load, modify and save one artifact. `apply` returns whether it changed
    /// anything; nothing is written when it did not.
    fn update(
        &self,
        id: &ArtifactId,
        apply: &mut dyn FnMut(&mut Artifact) -> Result<bool>,
    ) -> Result<bool> {
        let mut artifact = self.load(id)?;
        if !apply(&mut artifact)? {
            return Ok(false);
        }
        self.save(&artifact)?;
        Ok(true)
    }
}

/// One YAML file per artifact under a root directory:
///
/// ```text
/// <root>/A/A.yml
/// <root>/A/A.1/A.1.yml
/// <root>/A/A.1/A.1.1.yml
/// ```
///
/// Files may carry a slug after the id (`A.1.1.add-login.yml`); the `id`
/// field inside the file is authoritative.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical location for `id`: one directory per ancestor level, plus a
    /// directory of its own for initiatives and milestones. Issues sit in
    /// their milestone's directory.
    pub fn path_for(&self, id: &ArtifactId) -> PathBuf {
        let mut dir = self.root.clone();
        let mut ancestors = Vec::new();
        let mut current = id.parent();
        while let Some(ancestor) = current {
            current = ancestor.parent();
            ancestors.push(ancestor);
        }
        for ancestor in ancestors.iter().rev() {
            dir.push(ancestor.to_string());
        }
        if id.kind() != ArtifactKind::Issue {
            dir.push(id.to_string());
        }
        dir.join(format!("{id}.yml"))
    }

    fn yaml_files(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let full_pattern = self.root.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();
        let mut files: Vec<PathBuf> = glob(&pattern_str)
            .map_err(|e| anyhow::anyhow!("Invalid glob pattern '{pattern_str}': {e}"))?
            .filter_map(|r| r.ok())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Path of the file holding `id`: the canonical path if it exists,
    /// otherwise any `<id>*.yml` whose contents carry that id.
    fn locate(&self, id: &ArtifactId) -> Result<Option<PathBuf>> {
        let canonical = self.path_for(id);
        if canonical.exists() {
            return Ok(Some(canonical));
        }

        for path in self.yaml_files(&format!("**/{id}*.yml"))? {
            match read_artifact(&path) {
                Ok(artifact) if &artifact.id == id => return Ok(Some(path)),
                Ok(_) => {}
                Err(e) => debug!(path = %path.display(), "skipping unreadable candidate: {e:#}"),
            }
        }
        Ok(None)
    }
}

impl ArtifactStore for FsArtifactStore {
    /// Files that fail to parse are skipped with a warning; the snapshot is
    /// partial rather than absent.
    fn load_all(&self) -> Result<ArtifactSet> {
        let mut artifacts = ArtifactSet::new();
        if !self.root.exists() {
            warn!(root = %self.root.display(), "artifacts directory does not exist");
            return Ok(artifacts);
        }

        for path in self.yaml_files("**/*.yml")? {
            let artifact = match read_artifact(&path) {
                Ok(artifact) => artifact,
                Err(e) => {
                    warn!(path = %path.display(), "skipping artifact file: {e:#}");
                    continue;
                }
            };
            if let Some(previous) = artifacts.insert(artifact) {
                warn!(
                    id = %previous.id,
                    path = %path.display(),
                    "artifact id appears in more than one file; keeping the later one"
                );
            }
        }

        debug!(count = artifacts.len(), "loaded artifact snapshot");
        Ok(artifacts)
    }

    fn load(&self, id: &ArtifactId) -> Result<Artifact> {
        let Some(path) = self.locate(id)? else {
            bail!("Artifact {id} not found under {}", self.root.display());
        };
        let artifact = read_artifact(&path)?;
        if &artifact.id != id {
            bail!(
                "File {} holds artifact {}, expected {id}",
                path.display(),
                artifact.id
            );
        }
        Ok(artifact)
    }

    fn save(&self, artifact: &Artifact) -> Result<()> {
        let path = self
            .locate(&artifact.id)?
            .unwrap_or_else(|| self.path_for(&artifact.id));
        let content = serde_yaml::to_string(artifact)
            .with_context(|| format!("Failed to serialize artifact {}", artifact.id))?;
        locked_write(&path, &content)
    }

    /// Holds the file's exclusive lock for the whole read-modify-write.
    fn update(
        &self,
        id: &ArtifactId,
        apply: &mut dyn FnMut(&mut Artifact) -> Result<bool>,
    ) -> Result<bool> {
        let Some(path) = self.locate(id)? else {
            bail!("Artifact {id} not found under {}", self.root.display());
        };

        locked_update(&path, |current| {
            let mut artifact = parse_artifact(current, &path)?;
            if !apply(&mut artifact)? {
                return Ok(None);
            }
            let content = serde_yaml::to_string(&artifact)
                .with_context(|| format!("Failed to serialize artifact {id}"))?;
            Ok(Some(content))
        })
    }
}

fn read_artifact(path: &Path) -> Result<Artifact> {
    let content = locked_read(path)?;
    parse_artifact(&content, path)
}

fn parse_artifact(content: &str, path: &Path) -> Result<Artifact> {
    serde_yaml::from_str(content)
        .with_context(|| format!("Failed to parse artifact file: {}", path.display()))
}

/// Map-backed store, for tests and dry runs over a copied snapshot.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: RefCell<BTreeMap<ArtifactId, Artifact>>,
}

impl MemoryArtifactStore {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self {
            artifacts: RefCell::new(
                artifacts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            ),
        }
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn load_all(&self) -> Result<ArtifactSet> {
        Ok(ArtifactSet::from(self.artifacts.borrow().clone()))
    }

    fn load(&self, id: &ArtifactId) -> Result<Artifact> {
        match self.artifacts.borrow().get(id) {
            Some(artifact) => Ok(artifact.clone()),
            None => bail!("Artifact {id} not found"),
        }
    }

    fn save(&self, artifact: &Artifact) -> Result<()> {
        self.artifacts
            .borrow_mut()
            .insert(artifact.id.clone(), artifact.clone());
        Ok(())
    }
}
