//! `kodebase transition <id> <state> --trigger <trigger>`

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cascade::CascadeEngine;
use crate::fs::ArtifactStore;
use crate::lifecycle::create_event;
use crate::models::actor::Actor;
use crate::models::artifact_id::ArtifactId;
use crate::models::event::{ArtifactState, BlockingDependency, Event, EventMetadata, Trigger};
use crate::models::timestamp::Timestamp;

use super::common::{colored_state, parse_id, Workspace};

/// Build the event for `state`/`trigger` and append it to `id`.
///
/// A `blocked` event takes its blocking list from the artifact's
/// `blocked_by` relationships, every entry pending.
pub fn apply_transition<S: ArtifactStore>(
    store: &S,
    id: &ArtifactId,
    state: ArtifactState,
    trigger: Trigger,
    actor: &Actor,
    at: Timestamp,
) -> Result<Event> {
    let mut appended = None;
    store.update(id, &mut |artifact| {
        let metadata = (state == ArtifactState::Blocked).then(|| {
            EventMetadata::with_blocking(
                artifact
                    .metadata
                    .relationships
                    .blocked_by
                    .iter()
                    .cloned()
                    .map(BlockingDependency::pending)
                    .collect(),
            )
        });
        let event = create_event(state, actor.clone(), trigger, Some(at), metadata)?;
        artifact.append_event(event.clone())?;
        appended = Some(event);
        Ok(true)
    })?;

    appended.with_context(|| format!("No event appended to {id}"))
}

pub fn execute(id: &str, state: ArtifactState, trigger: Trigger, actor: Option<&str>) -> Result<()> {
    let workspace = Workspace::discover()?;
    let id = parse_id(id)?;
    let actor = workspace.config.resolve_actor(actor)?;

    let event = apply_transition(&workspace.store, &id, state, trigger, &actor, Timestamp::now())
        .with_context(|| format!("Failed to move {id} to {state}"))?;

    println!(
        "{} {} → {} ({})",
        "✓".green().bold(),
        id.to_string().bold(),
        colored_state(event.state()),
        event.trigger()
    );

    print_cascade_hint(&workspace.store, &workspace.engine(), &id)
}

/// Point at any parent move the new state implies. Nothing is written.
fn print_cascade_hint<S: ArtifactStore>(store: &S, engine: &CascadeEngine, id: &ArtifactId) -> Result<()> {
    let artifacts = store.load_all()?;
    if let Some(rec) = engine.recommend_for_parent(&artifacts, id) {
        println!(
            "{} parent {} can move {} → {} ({}); run `kodebase cascade {id}`",
            "→".cyan().bold(),
            rec.artifact_id.to_string().bold(),
            colored_state(rec.from_state),
            colored_state(rec.recommendation.target_state),
            rec.recommendation.reason
        );
    }
    Ok(())
}
