use anyhow::Result;
use clap::{Parser, Subcommand};
use kodebase::commands::{cascade, complete, context, status, transition, validate};
use kodebase::models::event::{ArtifactState, Trigger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the tracing filter directives.
const LOG_ENV: &str = "KODEBASE_LOG";

#[derive(Parser)]
#[command(name = "kodebase")]
#[command(about = "Event-sourced lifecycle for initiatives, milestones and issues", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every event log and the dependency graph
    Validate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an artifact's state, history and possible next states
    Status {
        /// Artifact ID (e.g. A, A.1, A.1.3)
        id: String,
    },

    /// Append a state transition to an artifact
    Transition {
        /// Artifact ID
        id: String,

        /// Target state (draft, ready, blocked, in_progress, in_review, completed, cancelled, archived)
        state: ArtifactState,

        /// Trigger justifying the transition (e.g. branch_created, pr_ready)
        #[arg(short, long)]
        trigger: Trigger,

        /// Actor as "Name (email)"; defaults to KODEBASE_ACTOR, then config
        #[arg(short, long)]
        actor: Option<String>,
    },

    /// Mark an artifact completed and apply the resulting cascade
    Complete {
        /// Artifact ID
        id: String,

        /// Actor as "Name (email)"; defaults to KODEBASE_ACTOR, then config
        #[arg(short, long)]
        actor: Option<String>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the cascade recommendations for an artifact without applying them
    Cascade {
        /// Artifact ID
        id: String,
    },

    /// Summarize a milestone or initiative and everything beneath it
    Context {
        /// Milestone (A.1) or initiative (A) ID
        id: String,

        /// Print the context as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Validate { json } => validate::execute(json),
        Commands::Status { id } => status::execute(&id),
        Commands::Transition {
            id,
            state,
            trigger,
            actor,
        } => transition::execute(&id, state, trigger, actor.as_deref()),
        Commands::Complete { id, actor, dry_run } => {
            complete::execute(&id, actor.as_deref(), dry_run)
        }
        Commands::Cascade { id } => cascade::execute(&id),
        Commands::Context { id, json } => context::execute(&id, json),
    }
}
