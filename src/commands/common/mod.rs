//! Shared plumbing for the CLI commands: project discovery, config and
//! store setup, id parsing and a few display helpers.

use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};

use crate::cascade::CascadeEngine;
use crate::config::{KodebaseConfig, KODEBASE_DIR};
use crate::fs::FsArtifactStore;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::ArtifactState;

/// Find the project root by walking up from `start` until a directory
/// containing `.kodebase/` is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let kodebase = current.join(KODEBASE_DIR);
        if kodebase.is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => bail!("Could not find {KODEBASE_DIR} directory. Are you in a kodebase project?"),
        }
    }
}

/// Everything a command needs to act on one project.
pub struct Workspace {
    pub root: PathBuf,
    pub config: KodebaseConfig,
    pub store: FsArtifactStore,
}

impl Workspace {
    /// Open the project containing the current directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let root = find_project_root(&cwd)?;
        Self::open(&root)
    }

    pub fn open(root: &Path) -> Result<Self> {
        let config = KodebaseConfig::load(root)?;
        let store = FsArtifactStore::new(config.artifacts_path(root));
        Ok(Self {
            root: root.to_path_buf(),
            config,
            store,
        })
    }

    pub fn engine(&self) -> CascadeEngine {
        CascadeEngine::new(self.config.cascade)
    }
}

pub fn parse_id(value: &str) -> Result<ArtifactId> {
    ArtifactId::parse(value).with_context(|| format!("Invalid artifact id '{value}'"))
}

/// State name colored by how far along it is.
pub fn colored_state(state: ArtifactState) -> ColoredString {
    let label = state.as_str();
    match state {
        ArtifactState::Draft => label.dimmed(),
        ArtifactState::Ready => label.cyan(),
        ArtifactState::Blocked => label.red(),
        ArtifactState::InProgress => label.yellow(),
        ArtifactState::InReview => label.magenta(),
        ArtifactState::Completed => label.green(),
        ArtifactState::Cancelled | ArtifactState::Archived => label.bright_black(),
    }
}

/// Collapse to one line and cut to `max_len` characters with an ellipsis.
pub fn truncate_for_display(s: &str, max_len: usize) -> String {
    let single_line: String = s.lines().collect::<Vec<_>>().join(" ");

    if single_line.chars().count() <= max_len {
        single_line
    } else {
        let truncated: String = single_line
            .chars()
            .take(max_len.saturating_sub(1))
            .collect();
        format!("{truncated}…")
    }
}
