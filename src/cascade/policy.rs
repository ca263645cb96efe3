use serde::{Deserialize, Serialize};

use crate::models::event::ArtifactState;

/// How many children must be review-ready before a parent is sent to review.
///
/// A child is review-ready once it is `in_review` or `completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionThreshold {
    /// Every counted child is review-ready.
    #[default]
    All,
    /// At least this percentage (1-100) of counted children is review-ready.
    Quorum(u8),
}

/// `in_review` or `completed`.
pub fn is_review_ready(state: ArtifactState) -> bool {
    matches!(state, ArtifactState::InReview | ArtifactState::Completed)
}

impl CompletionThreshold {
    /// Evaluate the threshold over the current states of all children.
    ///
    /// Cancelled and archived children do not count either way. At least one
    /// counted child has to be review-ready.
    pub fn is_met(&self, child_states: &[ArtifactState]) -> bool {
        let counted = child_states
            .iter()
            .filter(|s| !matches!(s, ArtifactState::Cancelled | ArtifactState::Archived))
            .count();
        let ready = child_states.iter().filter(|s| is_review_ready(**s)).count();

        if ready == 0 {
            return false;
        }

        match self {
            CompletionThreshold::All => ready == counted,
            CompletionThreshold::Quorum(percent) => {
                let percent = usize::from((*percent).clamp(1, 100));
                ready * 100 >= percent * counted
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadePolicy {
    #[serde(default)]
    pub completion: CompletionThreshold,
}
