use chrono::{Local, NaiveDate};

use crate::error::Violation;
use crate::models::{normalize_flyer, Event, EventDraft, Policy};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(Event),
    Invalid(Vec<Violation>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }
}

pub struct Validator {
    reject_past_dates: bool,
    today: NaiveDate,
}

impl Validator {
    pub fn new(policy: Policy) -> Self {
        Self {
            reject_past_dates: policy.reject_past_dates,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Applies every check and reports all failures together.
    pub fn validate(&self, draft: &EventDraft) -> Validation {
        let mut reasons = Vec::new();

        let artist_name = draft.artist_name.trim();
        let venue_name = draft.venue_name.trim();
        let city = draft.city.trim();

        if artist_name.is_empty() {
            reasons.push(Violation::MissingArtist);
        }
        if venue_name.is_empty() {
            reasons.push(Violation::MissingVenue);
        }
        if city.is_empty() {
            reasons.push(Violation::MissingCity);
        }

        let event_date = parse_event_date(&draft.event_date);
        match event_date {
            None => reasons.push(Violation::InvalidDate(draft.event_date.clone())),
            Some(date) if self.reject_past_dates && date < self.today => {
                reasons.push(Violation::PastDate(date));
            }
            Some(_) => {}
        }

        match event_date {
            Some(event_date) if reasons.is_empty() => Validation::Valid(Event {
                artist_name: artist_name.to_string(),
                venue_name: venue_name.to_string(),
                city: city.to_string(),
                event_date,
                flyer_url: normalize_flyer(draft.flyer_url.as_deref()),
            }),
            _ => Validation::Invalid(reasons),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

/// Only the zero-padded `YYYY-MM-DD` form is accepted, so stored dates
/// always sort correctly as text.
pub fn parse_event_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if !is_canonical_date(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn is_canonical_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
