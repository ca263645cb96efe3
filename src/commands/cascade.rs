//! `kodebase cascade <id>`: show what the cascade engine would do about
//! `<id>`'s current state. Read-only.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;

use crate::cascade::{find_dependents, ArtifactRecommendation, CascadeEngine};
use crate::fs::ArtifactStore;
use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::ArtifactState;
use crate::models::timestamp::Timestamp;

use super::common::{colored_state, parse_id, Workspace};

#[derive(Debug, Clone, PartialEq)]
pub struct CascadePreview {
    pub state: ArtifactState,
    pub parent: Option<ArtifactRecommendation>,
    pub children: Vec<ArtifactRecommendation>,
    /// Blocked dependents that would become ready if `<id>` were completed
    /// now, and those that would keep waiting.
    pub unblockable: Vec<ArtifactId>,
    pub still_waiting: Vec<ArtifactId>,
}

pub fn preview(artifacts: &ArtifactSet, engine: &CascadeEngine, id: &ArtifactId) -> Result<CascadePreview> {
    let artifact = artifacts
        .get(id)
        .with_context(|| format!("Artifact {id} not found"))?;
    let state = artifact
        .current_state()
        .with_context(|| format!("Artifact {id} has an empty event log"))?;

    let mut unblockable = Vec::new();
    let mut still_waiting = Vec::new();
    for dependent in find_dependents(artifacts, id) {
        if dependent.current_state() != Some(ArtifactState::Blocked) {
            continue;
        }
        match engine.resolve_dependency_completion(dependent, id, Timestamp::now()) {
            Ok(resolution) if resolution.ready.is_some() => unblockable.push(dependent.id.clone()),
            Ok(_) => still_waiting.push(dependent.id.clone()),
            Err(e) => warn!(dependent_id = %dependent.id, "{e}; left out of the preview"),
        }
    }

    Ok(CascadePreview {
        state,
        parent: engine.recommend_for_parent(artifacts, id),
        children: engine.cascade_to_children(artifact, artifacts),
        unblockable,
        still_waiting,
    })
}

pub fn execute(id: &str) -> Result<()> {
    let workspace = Workspace::discover()?;
    let id = parse_id(id)?;
    let artifacts = workspace.store.load_all()?;
    let preview = preview(&artifacts, &workspace.engine(), &id)?;
    print_preview(&id, &preview);
    Ok(())
}

fn print_preview(id: &ArtifactId, preview: &CascadePreview) {
    println!(
        "{} {} is {}",
        "→".cyan().bold(),
        id.to_string().bold(),
        colored_state(preview.state)
    );

    let mut any = false;
    if let Some(parent) = &preview.parent {
        any = true;
        println!(
            "  {} parent {} {} → {} via {} ({})",
            "↑".cyan(),
            parent.artifact_id,
            colored_state(parent.from_state),
            colored_state(parent.recommendation.target_state),
            parent.recommendation.trigger,
            parent.recommendation.reason
        );
    }
    for child in &preview.children {
        any = true;
        println!(
            "  {} child {} {} → {} via {}",
            "↓".cyan(),
            child.artifact_id,
            colored_state(child.from_state),
            colored_state(child.recommendation.target_state),
            child.recommendation.trigger
        );
    }
    if !preview.unblockable.is_empty() {
        any = true;
        let ids: Vec<String> = preview.unblockable.iter().map(ToString::to_string).collect();
        println!("  {} on completion unblocks {}", "→".cyan(), ids.join(", "));
    }
    if !preview.still_waiting.is_empty() {
        any = true;
        let ids: Vec<String> = preview.still_waiting.iter().map(ToString::to_string).collect();
        println!("  {} on completion progresses {}", "·".yellow(), ids.join(", "));
    }
    if !any {
        println!("  {} no cascade", "✓".green());
    }
}
