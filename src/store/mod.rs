pub mod rest;
pub mod sqlite;

use thiserror::Error;

use crate::filter::{Clause, DATE_COLUMN};
use crate::models::Event;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

pub const EVENTS_TABLE: &str = "events";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("store rejected request: {0}")]
    Rejected(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Sort applied to every read. Only ascending event date is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    DateAscending,
}

impl OrderBy {
    pub fn column(self) -> &'static str {
        match self {
            OrderBy::DateAscending => DATE_COLUMN,
        }
    }
}

/// The remote `events` collection as seen by the listing core.
pub trait EventStore: Send + Sync {
    /// Cheap round trip proving the store is reachable and authorized.
    fn ping(&self) -> Result<(), StoreError>;

    /// Rows matching every clause, sorted by `order`. No limit is applied.
    fn select(&self, clauses: &[Clause], order: OrderBy) -> Result<Vec<Event>, StoreError>;

    /// Persist one record. Any identifier the store assigns is ignored.
    fn insert(&self, event: &Event) -> Result<(), StoreError>;
}
