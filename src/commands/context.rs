//! `kodebase context <id>`: a milestone or initiative together with every
//! artifact beneath it, their states and what they are waiting on.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::cascade::is_review_ready;
use crate::fs::ArtifactStore;
use crate::models::artifact::{Artifact, ArtifactSet};
use crate::models::artifact_id::{ArtifactId, ArtifactKind};
use crate::models::event::ArtifactState;

use super::common::{colored_state, parse_id, truncate_for_display, Workspace};

/// One descendant of the artifact the context is built for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextEntry {
    pub artifact_id: ArtifactId,
    pub title: String,
    pub state: Option<ArtifactState>,
    /// Unresolved entries of the latest blocking list while blocked.
    pub blocked_on: Vec<ArtifactId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactContext {
    pub artifact_id: ArtifactId,
    pub kind: ArtifactKind,
    pub title: String,
    pub state: Option<ArtifactState>,
    /// Descendants depth-first: each milestone is followed by its issues.
    pub entries: Vec<ContextEntry>,
}

impl ArtifactContext {
    /// Direct children that are in review or completed, out of all direct
    /// children.
    pub fn progress(&self) -> (usize, usize) {
        let children: Vec<&ContextEntry> = self
            .entries
            .iter()
            .filter(|e| self.artifact_id.is_parent_of(&e.artifact_id))
            .collect();
        let ready = children
            .iter()
            .filter(|e| e.state.is_some_and(is_review_ready))
            .count();
        (ready, children.len())
    }

    pub fn blocked(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter().filter(|e| e.state == Some(ArtifactState::Blocked))
    }
}

/// Gather `id` and its descendants out of `artifacts`.
///
/// Only milestones and initiatives have a context; an issue id is rejected.
pub fn build_context(artifacts: &ArtifactSet, id: &ArtifactId) -> Result<ArtifactContext> {
    if id.kind() == ArtifactKind::Issue {
        bail!("{id} is an issue; context needs a milestone (A.1) or an initiative (A)");
    }
    let artifact = artifacts
        .get(id)
        .with_context(|| format!("{} {id} not found", id.kind()))?;

    let mut entries = Vec::new();
    collect_descendants(artifacts, id, &mut entries);

    Ok(ArtifactContext {
        artifact_id: id.clone(),
        kind: id.kind(),
        title: artifact.metadata.title.clone(),
        state: artifact.current_state(),
        entries,
    })
}

fn collect_descendants(artifacts: &ArtifactSet, parent: &ArtifactId, entries: &mut Vec<ContextEntry>) {
    for child in artifacts.children_of(parent) {
        entries.push(entry_for(child));
        collect_descendants(artifacts, &child.id, entries);
    }
}

fn entry_for(artifact: &Artifact) -> ContextEntry {
    let state = artifact.current_state();
    let blocked_on = match (state, artifact.latest_blocked_event()) {
        (Some(ArtifactState::Blocked), Some(event)) => event
            .metadata()
            .map(|m| m.unresolved_dependencies().cloned().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    ContextEntry {
        artifact_id: artifact.id.clone(),
        title: artifact.metadata.title.clone(),
        state,
        blocked_on,
    }
}

pub fn execute(id: &str, json: bool) -> Result<()> {
    let workspace = Workspace::discover()?;
    let id = parse_id(id)?;
    let artifacts = workspace.store.load_all()?;
    let context = build_context(&artifacts, &id)?;

    if json {
        let out = serde_json::to_string_pretty(&context).context("Failed to serialize context")?;
        println!("{out}");
    } else {
        print_context(&context);
    }
    Ok(())
}

fn print_context(context: &ArtifactContext) {
    println!(
        "{} {} {}",
        context.kind.to_string().dimmed(),
        context.artifact_id.to_string().bold(),
        truncate_for_display(&context.title, 60)
    );
    match context.state {
        Some(state) => println!("  State: {}", colored_state(state).bold()),
        None => println!("  {} event log is empty", "✗".red().bold()),
    }

    if context.entries.is_empty() {
        println!("\n{} no children yet", "→".cyan().bold());
        return;
    }

    let (ready, total) = context.progress();
    println!("  Progress: {ready}/{total} in review or completed\n");

    for entry in &context.entries {
        let indent = "  ".repeat(entry.artifact_id.depth() - context.artifact_id.depth());
        let state = match entry.state {
            Some(state) => colored_state(state),
            None => "no events".red(),
        };
        println!(
            "{indent}{:<8} {:<12} {}",
            entry.artifact_id.to_string().bold(),
            state,
            truncate_for_display(&entry.title, 50)
        );
        if !entry.blocked_on.is_empty() {
            let ids: Vec<String> = entry.blocked_on.iter().map(ToString::to_string).collect();
            println!("{indent}  {} waiting on {}", "·".yellow(), ids.join(", "));
        }
    }

    let blocked = context.blocked().count();
    if blocked > 0 {
        println!("\n{} {blocked} blocked", "⚠".yellow().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::EventBuilder;
    use crate::models::actor::Actor;
    use crate::models::event::BlockingDependency;
    use crate::models::timestamp::Timestamp;

    fn jane() -> Actor {
        Actor::parse("Jane Doe (jane@example.com)").unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn id(s: &str) -> ArtifactId {
        ArtifactId::parse(s).unwrap()
    }

    fn draft(s: &str) -> Artifact {
        Artifact::new_at(id(s), format!("Title {s}"), jane(), ts("2025-01-01T00:00:00Z"))
    }

    fn snapshot() -> ArtifactSet {
        let mut reviewed = draft("A.1.1");
        for (builder, at) in [
            (EventBuilder::ready(jane()), "2025-01-02T00:00:00Z"),
            (EventBuilder::in_progress(jane()), "2025-01-03T00:00:00Z"),
            (EventBuilder::in_review(jane()), "2025-01-04T00:00:00Z"),
        ] {
            reviewed.append_event(builder.at(ts(at)).build().unwrap()).unwrap();
        }

        let mut waiting = draft("A.1.2");
        waiting.add_blocked_by(id("A.1.1"));
        waiting
            .append_event(
                EventBuilder::blocked(jane(), vec![BlockingDependency::pending(id("A.1.1"))])
                    .at(ts("2025-01-02T00:00:00Z"))
                    .build()
                    .unwrap(),
            )
            .unwrap();

        vec![
            draft("A"),
            draft("A.1"),
            reviewed,
            waiting,
            draft("A.2"),
            draft("A.2.1"),
            draft("B"),
            draft("B.1"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_milestone_context_lists_issues() {
        let context = build_context(&snapshot(), &id("A.1")).unwrap();
        assert_eq!(context.kind, ArtifactKind::Milestone);
        assert_eq!(context.title, "Title A.1");
        assert_eq!(context.state, Some(ArtifactState::Draft));

        let ids: Vec<String> = context.entries.iter().map(|e| e.artifact_id.to_string()).collect();
        assert_eq!(ids, vec!["A.1.1", "A.1.2"]);
        assert_eq!(context.entries[0].state, Some(ArtifactState::InReview));
        assert!(context.entries[0].blocked_on.is_empty());
        assert_eq!(context.entries[1].state, Some(ArtifactState::Blocked));
        assert_eq!(context.entries[1].blocked_on, vec![id("A.1.1")]);
        assert_eq!(context.progress(), (1, 2));
        assert_eq!(context.blocked().count(), 1);
    }

    #[test]
    fn test_initiative_context_walks_depth_first() {
        let context = build_context(&snapshot(), &id("A")).unwrap();
        let ids: Vec<String> = context.entries.iter().map(|e| e.artifact_id.to_string()).collect();
        assert_eq!(ids, vec!["A.1", "A.1.1", "A.1.2", "A.2", "A.2.1"]);
        // progress counts the milestones only
        assert_eq!(context.progress(), (0, 2));
    }

    #[test]
    fn test_context_rejects_issue_ids() {
        let err = build_context(&snapshot(), &id("A.1.1")).unwrap_err();
        assert!(err.to_string().contains("is an issue"));
    }

    #[test]
    fn test_context_for_unknown_id_fails() {
        let err = build_context(&snapshot(), &id("C.4")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_childless_milestone_has_empty_context() {
        let context = build_context(&snapshot(), &id("B.1")).unwrap();
        assert!(context.entries.is_empty());
        assert_eq!(context.progress(), (0, 0));
    }
}
