//! `kodebase validate`: event-history and dependency-graph checks over the
//! whole artifact tree.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::error::LifecycleError;
use crate::fs::ArtifactStore;
use crate::graph::{validate_dependencies, DependencyIssue, DependencyReport, Severity};
use crate::lifecycle::validate_event_history;
use crate::models::artifact::ArtifactSet;
use crate::models::artifact_id::ArtifactId;

use super::common::Workspace;

/// An artifact whose event log fails validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryIssue {
    pub artifact_id: ArtifactId,
    pub code: &'static str,
    pub message: String,
}

impl HistoryIssue {
    fn new(artifact_id: ArtifactId, error: &LifecycleError) -> Self {
        Self {
            artifact_id,
            code: error.code().as_str(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub artifacts_checked: usize,
    pub history: Vec<HistoryIssue>,
    pub dependencies: DependencyReport,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.history.is_empty() || self.dependencies.has_errors()
    }

    pub fn error_count(&self) -> usize {
        self.history.len() + self.dependencies.errors().count()
    }
}

/// Run every check over one snapshot.
pub fn validate_snapshot(artifacts: &ArtifactSet) -> ValidationReport {
    let history = artifacts
        .iter()
        .filter_map(|artifact| {
            validate_event_history(artifact.kind(), artifact.events())
                .err()
                .map(|e| HistoryIssue::new(artifact.id.clone(), &e))
        })
        .collect();

    ValidationReport {
        artifacts_checked: artifacts.len(),
        history,
        dependencies: validate_dependencies(artifacts),
    }
}

pub fn run<S: ArtifactStore>(store: &S) -> Result<ValidationReport> {
    let artifacts = store.load_all()?;
    Ok(validate_snapshot(&artifacts))
}

pub fn execute(json: bool) -> Result<()> {
    let workspace = Workspace::discover()?;
    let report = run(&workspace.store)?;

    if json {
        let out =
            serde_json::to_string_pretty(&report).context("Failed to serialize validation report")?;
        println!("{out}");
    } else {
        print_report(&report);
    }

    if report.has_errors() {
        bail!("Validation failed with {} error(s)", report.error_count());
    }
    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!(
        "{} Checked {} artifact(s)",
        "→".cyan().bold(),
        report.artifacts_checked
    );

    if report.history.is_empty() && report.dependencies.is_clean() {
        println!("{} No issues found", "✓".green().bold());
        return;
    }

    if !report.history.is_empty() {
        println!("\n{}", "Event history:".bold());
        for issue in &report.history {
            println!(
                "  {} {} [{}] {}",
                "✗".red().bold(),
                issue.artifact_id.to_string().bold(),
                issue.code.dimmed(),
                issue.message
            );
        }
    }

    if !report.dependencies.is_clean() {
        println!("\n{}", "Dependencies:".bold());
        for issue in &report.dependencies.issues {
            print_dependency_issue(issue);
        }
    }

    println!();
    let warnings = report.dependencies.warnings().count();
    println!(
        "{} error(s), {} warning(s)",
        report.error_count().to_string().red().bold(),
        warnings.to_string().yellow().bold()
    );
}

fn print_dependency_issue(issue: &DependencyIssue) {
    let marker = match issue.severity {
        Severity::Error => "✗".red().bold(),
        Severity::Warning => "⚠".yellow().bold(),
    };
    println!(
        "  {} {} [{}] {}",
        marker,
        issue.artifact_id.to_string().bold(),
        issue.code.as_str().dimmed(),
        issue.message
    );
}
