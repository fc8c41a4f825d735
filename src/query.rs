use tracing::{info, warn};

use crate::error::ListingError;
use crate::filter::{Clause, FilterBuilder};
use crate::models::{Event, Policy, SearchCriteria};
use crate::store::{EventStore, OrderBy, StoreError};

/// Runs a clause list against the store, oldest event date first.
pub struct QueryExecutor<'a> {
    store: &'a dyn EventStore,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a dyn EventStore) -> Self {
        Self { store }
    }

    /// An empty vector means nothing matched; failures never come back empty.
    pub fn execute(&self, clauses: &[Clause]) -> Result<Vec<Event>, ListingError> {
        match self.store.select(clauses, OrderBy::DateAscending) {
            Ok(events) => {
                info!(clauses = clauses.len(), rows = events.len(), "search complete");
                Ok(events)
            }
            Err(err) => {
                warn!("search failed: {err}");
                Err(match err {
                    StoreError::Connection(cause) => ListingError::Connectivity(cause),
                    other => ListingError::Query(other.to_string()),
                })
            }
        }
    }
}

/// Filter then execute in one call.
pub fn search(
    store: &dyn EventStore,
    policy: Policy,
    criteria: &SearchCriteria,
) -> Result<Vec<Event>, ListingError> {
    let clauses = FilterBuilder::new(policy).build(criteria)?;
    QueryExecutor::new(store).execute(&clauses)
}

/// Startup connectivity probe.
pub fn check_connection(store: &dyn EventStore) -> Result<(), ListingError> {
    store.ping().map_err(|err| {
        warn!("connection check failed: {err}");
        ListingError::Connectivity(err.to_string())
    })
}
