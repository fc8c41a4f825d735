use chrono::NaiveDate;
use show_listings_lib::{
    search, Clause, Event, EventDraft, EventStore, FilterBuilder, ListingError, OrderBy, Policy,
    QueryExecutor, SearchCriteria, SqliteStore, StoreError, SubmissionPipeline, Violation,
};

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn event(artist: &str, venue: &str, city: &str, day: &str) -> Event {
    Event {
        artist_name: artist.into(),
        venue_name: venue.into(),
        city: city.into(),
        event_date: date(day),
        flyer_url: None,
    }
}

/// Store holding the two reference listings, inserted newest first.
fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .insert(&event("Joe's Band", "The Vault", "Austin", "2024-03-01"))
        .unwrap();
    store
        .insert(&event("Sky High", "Red Room", "Dallas", "2024-02-15"))
        .unwrap();
    store
}

/// Fails the test if anything reaches the store.
struct UntouchableStore;

impl EventStore for UntouchableStore {
    fn ping(&self) -> Result<(), StoreError> {
        panic!("ping reached the store");
    }

    fn select(&self, _: &[Clause], _: OrderBy) -> Result<Vec<Event>, StoreError> {
        panic!("select reached the store");
    }

    fn insert(&self, _: &Event) -> Result<(), StoreError> {
        panic!("insert reached the store");
    }
}

#[test]
fn open_query_returns_everything_by_date() {
    let store = seeded_store();
    let clauses = FilterBuilder::default()
        .build(&SearchCriteria::default())
        .unwrap();
    assert!(clauses.is_empty());

    let events = QueryExecutor::new(&store).execute(&clauses).unwrap();
    let dates: Vec<_> = events.iter().map(|e| e.event_date).collect();
    assert_eq!(dates, vec![date("2024-02-15"), date("2024-03-01")]);
}

#[test]
fn city_search_is_case_insensitive() {
    let store = seeded_store();
    let criteria = SearchCriteria::default().with_city("austin");
    let events = search(&store, Policy::default(), &criteria).unwrap();
    assert_eq!(
        events,
        vec![event("Joe's Band", "The Vault", "Austin", "2024-03-01")]
    );
}

#[test]
fn search_ignores_case_outside_ascii() {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .insert(&event("Émile", "Kaufleuten", "ZÜRICH", "2024-04-01"))
        .unwrap();

    let by_city = SearchCriteria::default().with_city("zürich");
    assert_eq!(search(&store, Policy::default(), &by_city).unwrap().len(), 1);

    let by_artist = SearchCriteria::default().with_artist("émile");
    assert_eq!(search(&store, Policy::default(), &by_artist).unwrap().len(), 1);
}

#[test]
fn criteria_combine_with_and() {
    let store = seeded_store();
    store
        .insert(&event("Joe Solo", "Red Room", "Dallas", "2024-04-01"))
        .unwrap();

    let criteria = SearchCriteria::default()
        .with_city("Austin")
        .with_artist("Joe");
    let events = search(&store, Policy::default(), &criteria).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].artist_name, "Joe's Band");
}

#[test]
fn date_range_bounds_are_inclusive() {
    let store = SqliteStore::open_in_memory().unwrap();
    for day in ["2023-12-31", "2024-01-01", "2024-01-15", "2024-01-31", "2024-02-01"] {
        store.insert(&event("Act", "Hall", "Waco", day)).unwrap();
    }

    let criteria = SearchCriteria::default().with_dates(date("2024-01-01"), date("2024-01-31"));
    let dates: Vec<_> = search(&store, Policy::default(), &criteria)
        .unwrap()
        .into_iter()
        .map(|e| e.event_date)
        .collect();
    assert_eq!(
        dates,
        vec![date("2024-01-01"), date("2024-01-15"), date("2024-01-31")]
    );
}

#[test]
fn no_match_is_empty_not_an_error() {
    let store = seeded_store();
    let criteria = SearchCriteria::default().with_venue("Nowhere");
    assert!(search(&store, Policy::default(), &criteria)
        .unwrap()
        .is_empty());
}

#[test]
fn inverted_range_rejected_before_store_when_configured() {
    let policy = Policy {
        require_ordered_range: true,
        ..Policy::default()
    };
    let criteria = SearchCriteria::default().with_dates(date("2024-02-01"), date("2024-01-01"));
    let err = search(&UntouchableStore, policy, &criteria).unwrap_err();
    assert!(matches!(
        err.violations(),
        [Violation::InvertedRange { .. }]
    ));
}

#[test]
fn submitted_event_shows_up_in_open_query() {
    let store = seeded_store();
    let draft = EventDraft::new("New Act", "Hall", "Waco", "2024-05-01")
        .with_flyer("https://x/y.png");
    let accepted = SubmissionPipeline::new(&store, Policy::default())
        .submit(draft)
        .unwrap();

    let events = search(&store, Policy::default(), &SearchCriteria::default()).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events.last(), Some(&accepted));
    assert_eq!(accepted.flyer_url.as_deref(), Some("https://x/y.png"));
}

#[test]
fn empty_flyer_is_stored_absent() {
    let store = SqliteStore::open_in_memory().unwrap();
    let draft = EventDraft::new("New Act", "Hall", "Waco", "2024-05-01").with_flyer("");
    SubmissionPipeline::new(&store, Policy::default())
        .submit(draft)
        .unwrap();

    let events = search(&store, Policy::default(), &SearchCriteria::default()).unwrap();
    assert_eq!(events[0].flyer_url, None);
}

#[test]
fn invalid_submission_reports_all_reasons_without_store_call() {
    let draft = EventDraft::new("", "", "X", "2024-01-01");
    let err = SubmissionPipeline::new(&UntouchableStore, Policy::default())
        .submit(draft)
        .unwrap_err();

    match err {
        ListingError::Validation(reasons) => {
            assert_eq!(reasons, vec![Violation::MissingArtist, Violation::MissingVenue]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}
