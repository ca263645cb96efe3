//! `kodebase complete <id>`
//!
//! Marks an artifact completed (`pr_merged`) and walks the cascade:
//! dependents are unblocked, the parent is sent to review when its children
//! are done, and open children of a completed parent are archived.
//!
//! Completion is idempotent. Re-running on an already-completed artifact
//! appends nothing to it and only applies cascade steps that are still
//! outstanding.

use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::cascade::{ArtifactRecommendation, CascadeEngine};
use crate::error::LifecycleError;
use crate::fs::ArtifactStore;
use crate::lifecycle::EventBuilder;
use crate::models::actor::Actor;
use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::{ArtifactState, Event};
use crate::models::timestamp::Timestamp;

use super::common::{colored_state, parse_id, Workspace};

/// What happened to one dependent of the completed artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DependentUpdate {
    pub artifact_id: ArtifactId,
    /// Blockers still outstanding after this completion.
    pub unresolved: Vec<ArtifactId>,
    /// Whether the dependent moved to `ready`.
    pub unblocked: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOutcome {
    /// False when the artifact already carried a `completed` event.
    pub newly_completed: bool,
    pub dependents: Vec<DependentUpdate>,
    pub parent: Option<ArtifactRecommendation>,
    pub archived_children: Vec<ArtifactRecommendation>,
    /// Every event appended (or, on a dry run, that would be), per artifact.
    pub appended: BTreeMap<ArtifactId, Vec<Event>>,
}

/// Pending writes against an in-memory copy of the snapshot.
struct Plan {
    snapshot: ArtifactSet,
    appended: BTreeMap<ArtifactId, Vec<Event>>,
}

impl Plan {
    fn append(&mut self, id: &ArtifactId, event: Event) -> Result<()> {
        let artifact = self
            .snapshot
            .get_mut(id)
            .with_context(|| format!("Artifact {id} missing from snapshot"))?;
        artifact
            .append_event(event.clone())
            .with_context(|| format!("Failed to append {} event to {id}", event.state()))?;
        self.appended.entry(id.clone()).or_default().push(event);
        Ok(())
    }

    fn state_of(&self, id: &ArtifactId) -> Option<ArtifactState> {
        self.snapshot.get(id).and_then(|a| a.current_state())
    }
}

/// Complete `id` and cascade. With `dry_run`, nothing is written.
pub fn complete_artifact<S: ArtifactStore>(
    store: &S,
    engine: &CascadeEngine,
    id: &ArtifactId,
    actor: &Actor,
    at: Timestamp,
    dry_run: bool,
) -> Result<CompletionOutcome> {
    let mut snapshot = store.load_all()?;
    if !snapshot.contains(id) {
        // not picked up by the scan (unparsable neighbours, odd file name); load directly
        snapshot.insert(store.load(id)?);
    }
    let mut plan = Plan {
        snapshot,
        appended: BTreeMap::new(),
    };
    let mut outcome = CompletionOutcome::default();

    let already_completed = plan
        .snapshot
        .get(id)
        .is_some_and(|a| a.events().iter().any(|e| e.state() == ArtifactState::Completed));
    if already_completed {
        debug!(%id, "completed event already exists");
    } else {
        let event = EventBuilder::completed(actor.clone()).at(at).build()?;
        plan.append(id, event)?;
        outcome.newly_completed = true;
    }

    resolve_dependents(&mut plan, engine, id, at, &mut outcome)?;

    if let Some(rec) = engine.recommend_for_parent(&plan.snapshot, id) {
        let event = engine.event_for(&rec.recommendation, at)?;
        plan.append(&rec.artifact_id, event)?;
        outcome.parent = Some(rec);
    }

    let children = match plan.snapshot.get(id) {
        Some(parent) => engine.cascade_to_children(parent, &plan.snapshot),
        None => Vec::new(),
    };
    for rec in children {
        let event = engine.event_for(&rec.recommendation, at)?;
        plan.append(&rec.artifact_id, event)?;
        outcome.archived_children.push(rec);
    }

    if !dry_run {
        write_plan(store, &plan.appended)?;
    }
    outcome.appended = plan.appended;
    Ok(outcome)
}

fn resolve_dependents(
    plan: &mut Plan,
    engine: &CascadeEngine,
    completed_id: &ArtifactId,
    at: Timestamp,
    outcome: &mut CompletionOutcome,
) -> Result<()> {
    let dependent_ids: Vec<ArtifactId> = crate::cascade::find_dependents(&plan.snapshot, completed_id)
        .into_iter()
        .map(|a| a.id.clone())
        .collect();

    for dependent_id in dependent_ids {
        if plan.state_of(&dependent_id) != Some(ArtifactState::Blocked) {
            debug!(%dependent_id, "dependent not blocked; nothing to resolve");
            continue;
        }
        let Some(dependent) = plan.snapshot.get(&dependent_id) else {
            continue;
        };

        let resolution = match engine.resolve_dependency_completion(dependent, completed_id, at) {
            Ok(resolution) => resolution,
            Err(e @ LifecycleError::UnknownBlockingDependency { .. }) => {
                warn!(%dependent_id, "{e}; blocked_by and blocking list disagree");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(event) = resolution.event.clone() {
            plan.append(&dependent_id, event)?;
        }
        let unblocked = match &resolution.ready {
            Some(ready) => {
                plan.append(&dependent_id, engine.event_for(ready, at)?)?;
                true
            }
            None => false,
        };

        outcome.dependents.push(DependentUpdate {
            artifact_id: dependent_id,
            unresolved: resolution
                .dependencies
                .iter()
                .filter(|d| !d.resolved)
                .map(|d| d.artifact_id.clone())
                .collect(),
            unblocked,
        });
    }
    Ok(())
}

/// Re-apply the planned events to each artifact under its own file lock.
///
/// Artifacts are written one at a time in id order, with no rollback. If a
/// write fails, the artifacts before it keep their new events and the error
/// names them; re-running `complete` picks up the remaining steps.
fn write_plan<S: ArtifactStore>(store: &S, appended: &BTreeMap<ArtifactId, Vec<Event>>) -> Result<()> {
    let mut written: Vec<&ArtifactId> = Vec::new();
    for (id, events) in appended {
        store
            .update(id, &mut |artifact| {
                for event in events {
                    artifact.append_event(event.clone())?;
                }
                Ok(true)
            })
            .with_context(|| {
                if written.is_empty() {
                    format!("Failed to write events for {id}; nothing was written")
                } else {
                    let done: Vec<String> = written.iter().map(ToString::to_string).collect();
                    format!(
                        "Failed to write events for {id}; already written: {}",
                        done.join(", ")
                    )
                }
            })?;
        written.push(id);
    }
    Ok(())
}

pub fn execute(id: &str, actor: Option<&str>, dry_run: bool) -> Result<()> {
    let workspace = Workspace::discover()?;
    let id = parse_id(id)?;
    let actor = workspace.config.resolve_actor(actor)?;

    let outcome = complete_artifact(
        &workspace.store,
        &workspace.engine(),
        &id,
        &actor,
        Timestamp::now(),
        dry_run,
    )?;

    if dry_run {
        println!(
            "{} Running in {} mode - no changes will be made",
            "→".blue().bold(),
            "DRY-RUN".yellow().bold()
        );
    }
    print_outcome(&id, &outcome);
    Ok(())
}

fn print_outcome(id: &ArtifactId, outcome: &CompletionOutcome) {
    if outcome.newly_completed {
        println!("{} {} completed", "✓".green().bold(), id.to_string().bold());
    } else {
        println!(
            "{} {} already completed",
            "⚠".yellow().bold(),
            id.to_string().bold()
        );
    }

    for dependent in &outcome.dependents {
        if dependent.unblocked {
            println!(
                "  {} {} unblocked → {}",
                "✓".green(),
                dependent.artifact_id,
                colored_state(ArtifactState::Ready)
            );
        } else {
            let waiting: Vec<String> = dependent.unresolved.iter().map(ToString::to_string).collect();
            println!(
                "  {} {} still waiting on {}",
                "·".yellow(),
                dependent.artifact_id,
                waiting.join(", ")
            );
        }
    }

    if let Some(parent) = &outcome.parent {
        println!(
            "  {} parent {} {} → {} ({})",
            "↑".cyan(),
            parent.artifact_id,
            colored_state(parent.from_state),
            colored_state(parent.recommendation.target_state),
            parent.recommendation.reason
        );
    }

    for child in &outcome.archived_children {
        println!(
            "  {} child {} {} → {}",
            "↓".cyan(),
            child.artifact_id,
            colored_state(child.from_state),
            colored_state(child.recommendation.target_state)
        );
    }

    let total: usize = outcome.appended.values().map(Vec::len).sum();
    if total == 0 {
        println!("{} nothing to do", "→".cyan().bold());
    }
}
