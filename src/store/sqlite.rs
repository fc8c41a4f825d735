use std::path::Path;
use std::sync::Mutex;

use rusqlite::{functions::FunctionFlags, types::ToSql, Connection, ErrorCode};
use tracing::{debug, info};

use super::{EventStore, OrderBy, StoreError};
use crate::config;
use crate::filter::Clause;
use crate::models::Event;

/// Local `events` table backed by SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                StoreError::Connection(format!("cannot create {}: {err}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(classify)?;
        info!(path = %path.display(), "opened sqlite event store");
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(&config::default_database_path())
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(classify)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        register_fold(&conn).map_err(classify)?;
        init_schema(&conn).map_err(classify)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Connection("sqlite mutex poisoned".to_string()))?;
        op(&guard).map_err(classify)
    }
}

/// `fold(text)`: full Unicode lowercase, since SQLite's LIKE only folds ASCII.
fn register_fold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS events(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist_name TEXT NOT NULL,
            venue_name TEXT NOT NULL,
            city TEXT NOT NULL,
            event_date TEXT NOT NULL,
            flyer_url TEXT
        );
        CREATE INDEX IF NOT EXISTS events_event_date ON events(event_date);",
    )
}

impl EventStore for SqliteStore {
    fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get::<_, i64>(0))
        })?;
        Ok(())
    }

    fn select(&self, clauses: &[Clause], order: OrderBy) -> Result<Vec<Event>, StoreError> {
        let (sql, params) = select_sql(clauses, order);
        debug!(%sql, "sqlite select");

        self.with_conn(|conn| {
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| &**p).collect();
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(param_refs.as_slice(), |row| {
                Ok(Event {
                    artist_name: row.get(0)?,
                    venue_name: row.get(1)?,
                    city: row.get(2)?,
                    event_date: row.get(3)?,
                    flyer_url: row.get(4)?,
                })
            })?;
            let events = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (artist_name, venue_name, city, event_date, flyer_url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    event.artist_name,
                    event.venue_name,
                    event.city,
                    event.event_date,
                    event.flyer_url
                ],
            )
        })?;
        Ok(())
    }
}

/// Both sides go through `fold` so matching ignores case beyond ASCII;
/// `%`/`_` typed by the user are left live.
fn select_sql(clauses: &[Clause], order: OrderBy) -> (String, Vec<Box<dyn ToSql>>) {
    let mut sql = String::from(
        "SELECT artist_name, venue_name, city, event_date, flyer_url FROM events",
    );
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    for clause in clauses {
        let slot = params.len() + 1;
        match clause {
            Clause::Contains { field, needle } => {
                conditions.push(format!(
                    "fold({}) LIKE '%' || fold(?{slot}) || '%'",
                    field.column()
                ));
                params.push(Box::new(needle.clone()));
            }
            Clause::OnOrAfter(date) => {
                conditions.push(format!("{} >= ?{slot}", clause.column()));
                params.push(Box::new(*date));
            }
            Clause::OnOrBefore(date) => {
                conditions.push(format!("{} <= ?{slot}", clause.column()));
                params.push(Box::new(*date));
            }
        }
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY {} ASC, id ASC", order.column()));

    (sql, params)
}

fn classify(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::PermissionDenied
                    | ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
            ) =>
        {
            StoreError::Connection(err.to_string())
        }
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..) => StoreError::Decode(err.to_string()),
        _ => StoreError::Rejected(err.to_string()),
    }
}
