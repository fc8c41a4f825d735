use chrono::NaiveDate;
use tracing::debug;

use crate::error::{ListingError, Violation};
use crate::models::{Policy, SearchCriteria};

pub const DATE_COLUMN: &str = "event_date";

/// Free-text columns that accept a substring match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    City,
    ArtistName,
    VenueName,
}

impl TextField {
    pub fn column(self) -> &'static str {
        match self {
            TextField::City => "city",
            TextField::ArtistName => "artist_name",
            TextField::VenueName => "venue_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    ContainsIgnoreCase,
    GreaterOrEqual,
    LessOrEqual,
}

/// One conjunctive constraint on the `events` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Unanchored, case-insensitive substring. Wildcard characters in
    /// `needle` are passed through untouched.
    Contains { field: TextField, needle: String },
    OnOrAfter(NaiveDate),
    OnOrBefore(NaiveDate),
}

impl Clause {
    pub fn column(&self) -> &'static str {
        match self {
            Clause::Contains { field, .. } => field.column(),
            Clause::OnOrAfter(_) | Clause::OnOrBefore(_) => DATE_COLUMN,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Clause::Contains { .. } => Operator::ContainsIgnoreCase,
            Clause::OnOrAfter(_) => Operator::GreaterOrEqual,
            Clause::OnOrBefore(_) => Operator::LessOrEqual,
        }
    }

    /// The clause value as the store sees it.
    pub fn value(&self) -> String {
        match self {
            Clause::Contains { needle, .. } => needle.clone(),
            Clause::OnOrAfter(date) | Clause::OnOrBefore(date) => {
                date.format("%Y-%m-%d").to_string()
            }
        }
    }
}

pub struct FilterBuilder {
    policy: Policy,
}

impl FilterBuilder {
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// Clauses in the fixed order city, artist, venue, date-lower, date-upper.
    pub fn build(&self, criteria: &SearchCriteria) -> Result<Vec<Clause>, ListingError> {
        if let Some(range) = criteria.date_range {
            if self.policy.require_ordered_range && range.is_inverted() {
                return Err(ListingError::Validation(vec![Violation::InvertedRange {
                    start: range.start,
                    end: range.end,
                }]));
            }
        }
        Ok(build_clauses(criteria))
    }
}

impl Default for FilterBuilder {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

pub fn build_clauses(criteria: &SearchCriteria) -> Vec<Clause> {
    let mut clauses = Vec::new();

    let text_inputs = [
        (TextField::City, criteria.city.as_deref()),
        (TextField::ArtistName, criteria.artist.as_deref()),
        (TextField::VenueName, criteria.venue.as_deref()),
    ];
    for (field, input) in text_inputs {
        if let Some(needle) = non_blank(input) {
            clauses.push(Clause::Contains {
                field,
                needle: needle.to_string(),
            });
        }
    }

    if let Some(range) = criteria.date_range {
        clauses.push(Clause::OnOrAfter(range.start));
        clauses.push(Clause::OnOrBefore(range.end));
    }

    debug!(clauses = clauses.len(), "built search filter");
    clauses
}

fn non_blank(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_criteria_is_open() {
        assert!(build_clauses(&SearchCriteria::default()).is_empty());
    }

    #[test]
    fn blank_fields_contribute_nothing() {
        let criteria = SearchCriteria::default()
            .with_city("")
            .with_artist("   ")
            .with_venue("");
        assert!(build_clauses(&criteria).is_empty());
    }

    #[test]
    fn city_and_artist_make_two_clauses() {
        let criteria = SearchCriteria::default()
            .with_city("Austin")
            .with_artist("Joe");
        let clauses = build_clauses(&criteria);
        assert_eq!(
            clauses,
            vec![
                Clause::Contains {
                    field: TextField::City,
                    needle: "Austin".into()
                },
                Clause::Contains {
                    field: TextField::ArtistName,
                    needle: "Joe".into()
                },
            ]
        );
        assert_eq!(clauses[1].column(), "artist_name");
        assert_eq!(clauses[1].operator(), Operator::ContainsIgnoreCase);
    }

    #[test]
    fn clause_order_is_fixed() {
        let criteria = SearchCriteria::default()
            .with_dates(date(2024, 1, 1), date(2024, 1, 31))
            .with_venue("Vault")
            .with_artist("Joe")
            .with_city("Austin");
        let columns: Vec<_> = build_clauses(&criteria)
            .iter()
            .map(|c| (c.column(), c.operator()))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("city", Operator::ContainsIgnoreCase),
                ("artist_name", Operator::ContainsIgnoreCase),
                ("venue_name", Operator::ContainsIgnoreCase),
                ("event_date", Operator::GreaterOrEqual),
                ("event_date", Operator::LessOrEqual),
            ]
        );
    }

    #[test]
    fn wildcards_pass_through() {
        let criteria = SearchCriteria::default().with_artist("50%_off");
        let clauses = build_clauses(&criteria);
        assert_eq!(clauses[0].value(), "50%_off");
    }

    #[test]
    fn date_values_render_as_iso() {
        assert_eq!(Clause::OnOrBefore(date(2024, 1, 31)).value(), "2024-01-31");
    }

    #[test]
    fn inverted_range_passes_by_default() {
        let criteria = SearchCriteria::default().with_dates(date(2024, 2, 1), date(2024, 1, 1));
        let clauses = FilterBuilder::default().build(&criteria).unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn inverted_range_rejected_when_required() {
        let policy = Policy {
            require_ordered_range: true,
            ..Policy::default()
        };
        let criteria = SearchCriteria::default().with_dates(date(2024, 2, 1), date(2024, 1, 1));
        let err = FilterBuilder::new(policy).build(&criteria).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::InvertedRange {
                start: date(2024, 2, 1),
                end: date(2024, 1, 1)
            }]
        );
    }
}
