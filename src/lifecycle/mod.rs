//! Artifact lifecycle: the state machine, event construction and event-log
//! validation. Everything here is a pure function over its inputs.

pub mod builder;
pub mod order;
pub mod state_machine;

#[cfg(test)]
mod tests;

pub use builder::{create_event, EventBuilder};
pub use order::{validate_event_history, validate_event_order};
pub use state_machine::{
    allowed_triggers, can_transition, canonical_trigger, is_trigger_valid_for_state,
    valid_transitions,
};
