//! Whole-history validation of an event log

use crate::error::{LifecycleError, OrderViolation};
use crate::models::artifact_id::ArtifactKind;
use crate::models::event::{ArtifactState, Event, Trigger};

use super::state_machine::{ensure_transition, ensure_trigger_valid, is_metadata_refresh};

/// Check that `events` is a well-ordered log.
///
/// - the log is non-empty and starts with the `draft` creation event
/// - creation appears nowhere else
/// - timestamps never decrease (equal timestamps are fine)
/// - every (state, trigger) pair is legal on its own
///
/// Returns the first problem found, by index.
pub fn validate_event_order(events: &[Event]) -> Result<(), LifecycleError> {
    let Some(first) = events.first() else {
        return Err(order_error(0, OrderViolation::EmptyLog));
    };

    if first.state() != ArtifactState::Draft {
        return Err(order_error(
            0,
            OrderViolation::FirstEventNotCreation {
                state: first.state(),
                trigger: first.trigger(),
            },
        ));
    }

    for (index, event) in events.iter().enumerate() {
        ensure_trigger_valid(event.state(), event.trigger())?;

        if index == 0 {
            continue;
        }

        if event.trigger() == Trigger::ArtifactCreated {
            return Err(order_error(index, OrderViolation::DuplicateCreation));
        }

        let previous = &events[index - 1];
        if event.timestamp() < previous.timestamp() {
            return Err(order_error(
                index,
                OrderViolation::TimestampRegression {
                    previous: previous.timestamp(),
                    current: event.timestamp(),
                },
            ));
        }
    }

    Ok(())
}

/// [`validate_event_order`] plus a transition check between each pair of
/// consecutive events for an artifact of `kind`.
pub fn validate_event_history(kind: ArtifactKind, events: &[Event]) -> Result<(), LifecycleError> {
    validate_event_order(events)?;

    for pair in events.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if is_metadata_refresh(previous, next) {
            continue;
        }
        ensure_transition(kind, previous.state(), next.state())?;
    }

    Ok(())
}

fn order_error(index: usize, violation: OrderViolation) -> LifecycleError {
    LifecycleError::EventOrderInvalid { index, violation }
}
