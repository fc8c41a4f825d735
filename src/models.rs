use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One live-entertainment listing as it is stored in the `events` table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub artist_name: String,
    pub venue_name: String,
    pub city: String,
    pub event_date: NaiveDate, // YYYY-MM-DD on the wire
    #[serde(default)]
    pub flyer_url: Option<String>,
}

impl Event {
    pub fn title(&self) -> &str {
        &self.artist_name
    }
}

/// Raw, unvalidated submission fields as typed by a submitter.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct EventDraft {
    pub artist_name: String,
    pub venue_name: String,
    pub city: String,
    pub event_date: String,
    pub flyer_url: Option<String>,
}

impl EventDraft {
    pub fn new(
        artist_name: impl Into<String>,
        venue_name: impl Into<String>,
        city: impl Into<String>,
        event_date: impl Into<String>,
    ) -> Self {
        Self {
            artist_name: artist_name.into(),
            venue_name: venue_name.into(),
            city: city.into(),
            event_date: event_date.into(),
            flyer_url: None,
        }
    }

    pub fn with_flyer(mut self, flyer_url: impl Into<String>) -> Self {
        self.flyer_url = Some(flyer_url.into());
        self
    }

    /// Collapses a blank flyer to `None`.
    pub fn normalized(mut self) -> Self {
        self.flyer_url = normalize_flyer(self.flyer_url.as_deref());
        self
    }
}

pub fn normalize_flyer(flyer_url: Option<&str>) -> Option<String> {
    flyer_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Inclusive calendar-date bounds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Sparse search input; every field is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct SearchCriteria {
    pub city: Option<String>,
    pub artist: Option<String>,
    pub venue: Option<String>,
    pub date_range: Option<DateRange>,
}

impl SearchCriteria {
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }
}

/// Switches for checks the listing core does not enforce unless asked to.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Policy {
    /// Reject a date range whose start falls after its end.
    pub require_ordered_range: bool,
    /// Reject submissions dated before today.
    pub reject_past_dates: bool,
}
