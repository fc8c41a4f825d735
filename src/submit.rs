use tracing::{debug, info, warn};

use crate::error::ListingError;
use crate::models::{Event, EventDraft, Policy};
use crate::store::{EventStore, StoreError};
use crate::validate::{Validation, Validator};

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Received,
    Validating,
    Rejected,
    Submitting,
    Failed,
    Accepted,
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Rejected | SubmissionState::Failed | SubmissionState::Accepted
        )
    }

    /// Terminal state implied by a finished submission.
    pub fn of(outcome: &Result<Event, ListingError>) -> Self {
        match outcome {
            Ok(_) => SubmissionState::Accepted,
            Err(err) if err.is_local() => SubmissionState::Rejected,
            Err(_) => SubmissionState::Failed,
        }
    }
}

pub struct SubmissionPipeline<'a> {
    store: &'a dyn EventStore,
    validator: Validator,
}

impl<'a> SubmissionPipeline<'a> {
    pub fn new(store: &'a dyn EventStore, policy: Policy) -> Self {
        Self::with_validator(store, Validator::new(policy))
    }

    pub fn with_validator(store: &'a dyn EventStore, validator: Validator) -> Self {
        Self { store, validator }
    }

    /// Validates then inserts exactly once. Returns the record that was sent.
    pub fn submit(&self, draft: EventDraft) -> Result<Event, ListingError> {
        let mut state = SubmissionState::Received;
        let draft = draft.normalized();

        advance(&mut state, SubmissionState::Validating);
        let event = match self.validator.validate(&draft) {
            Validation::Valid(event) => event,
            Validation::Invalid(reasons) => {
                advance(&mut state, SubmissionState::Rejected);
                info!(reasons = reasons.len(), "submission rejected");
                return Err(ListingError::Validation(reasons));
            }
        };

        advance(&mut state, SubmissionState::Submitting);
        match self.store.insert(&event) {
            Ok(()) => {
                advance(&mut state, SubmissionState::Accepted);
                info!(artist = %event.artist_name, date = %event.event_date, "event submitted");
                Ok(event)
            }
            Err(err) => {
                advance(&mut state, SubmissionState::Failed);
                warn!("submission failed: {err}");
                Err(match err {
                    StoreError::Connection(cause) => ListingError::Connectivity(cause),
                    other => ListingError::Submission(other.to_string()),
                })
            }
        }
    }
}

fn advance(state: &mut SubmissionState, next: SubmissionState) {
    debug!(from = ?state, to = ?next, "submission state");
    *state = next;
}
