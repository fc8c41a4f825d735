use chrono::NaiveDate;
use thiserror::Error;

/// Outcome of every listing operation that did not succeed.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("event store unreachable: {0}")]
    Connectivity(String),
    #[error("error fetching events: {0}")]
    Query(String),
    #[error("invalid event: {}", join_violations(.0))]
    Validation(Vec<Violation>),
    #[error("error submitting event: {0}")]
    Submission(String),
}

impl ListingError {
    /// True when the failure was decided locally and nothing reached the store.
    pub fn is_local(&self) -> bool {
        matches!(self, ListingError::Validation(_))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ListingError::Validation(reasons) => reasons,
            _ => &[],
        }
    }
}

/// A single reason an input was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("artist name is required")]
    MissingArtist,
    #[error("venue name is required")]
    MissingVenue,
    #[error("city is required")]
    MissingCity,
    #[error("event date {0:?} is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("event date {0} is in the past")]
    PastDate(NaiveDate),
    #[error("date range starts on {start} but ends on {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

fn join_violations(reasons: &[Violation]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
