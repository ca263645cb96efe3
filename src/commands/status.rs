//! `kodebase status <id>`

use anyhow::Result;
use colored::Colorize;

use crate::fs::ArtifactStore;
use crate::graph::{validate_dependencies, DependencyReport, Severity};
use crate::lifecycle::{allowed_triggers, valid_transitions};
use crate::models::artifact::Artifact;
use crate::models::event::ArtifactState;

use super::common::{colored_state, parse_id, truncate_for_display, Workspace};

pub fn execute(id: &str) -> Result<()> {
    let workspace = Workspace::discover()?;
    let artifact = workspace.store.load(&parse_id(id)?)?;
    print_status(&artifact);

    let report = validate_dependencies(&workspace.store.load_all()?);
    print_dependency_issues(&artifact, &report);
    Ok(())
}

fn print_status(artifact: &Artifact) {
    println!(
        "{} {} {}",
        artifact.kind().to_string().dimmed(),
        artifact.id.to_string().bold(),
        truncate_for_display(&artifact.metadata.title, 60)
    );

    let Some(state) = artifact.current_state() else {
        println!("  {} event log is empty", "✗".red().bold());
        return;
    };
    println!("  State:    {}", colored_state(state).bold());
    println!("  Assignee: {}", artifact.metadata.assignee);

    let relationships = &artifact.metadata.relationships;
    if !relationships.blocked_by.is_empty() {
        let ids: Vec<String> = relationships.blocked_by.iter().map(ToString::to_string).collect();
        println!("  Blocked by: {}", ids.join(", "));
    }
    if !relationships.blocks.is_empty() {
        let ids: Vec<String> = relationships.blocks.iter().map(ToString::to_string).collect();
        println!("  Blocks:     {}", ids.join(", "));
    }

    println!("\n{}", "Events:".bold());
    for event in artifact.events() {
        println!(
            "  {}  {:<12} {:<22} {}",
            event.timestamp().to_string().dimmed(),
            colored_state(event.state()),
            event.trigger().as_str(),
            event.actor()
        );
        for dep in event.blocking_dependencies() {
            let mark = if dep.resolved {
                "✓".green()
            } else {
                "·".yellow()
            };
            println!("      {} {}", mark, dep.artifact_id);
        }
    }

    print_next_states(artifact, state);
}

fn print_dependency_issues(artifact: &Artifact, report: &DependencyReport) {
    let issues: Vec<_> = report.involving(&artifact.id).collect();
    if issues.is_empty() {
        return;
    }
    println!("\n{}", "Dependency issues:".bold());
    for issue in issues {
        let marker = match issue.severity {
            Severity::Error => "✗".red().bold(),
            Severity::Warning => "⚠".yellow().bold(),
        };
        println!("  {} [{}] {}", marker, issue.code.as_str().dimmed(), issue.message);
    }
}

fn print_next_states(artifact: &Artifact, state: ArtifactState) {
    let next = valid_transitions(artifact.kind(), state);
    if next.is_empty() {
        println!("\n{} no further transitions", "→".cyan().bold());
        return;
    }

    println!("\n{}", "Next:".bold());
    for target in next {
        let triggers: Vec<&str> = allowed_triggers(target).iter().map(|t| t.as_str()).collect();
        println!("  {:<12} via {}", colored_state(target), triggers.join(" | "));
    }
}
