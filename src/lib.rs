//! Lifecycle engine for kodebase artifacts: initiatives, milestones and
//! issues whose state is the last entry of an append-only event log.

pub mod cascade;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod lifecycle;
pub mod models;

pub use error::{ErrorCode, LifecycleError};
