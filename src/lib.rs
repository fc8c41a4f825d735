pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod store;
pub mod submit;
pub mod validate;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{AppConfig, Backend, ConfigStore};
pub use error::{ListingError, Violation};
pub use filter::{Clause, FilterBuilder, Operator, TextField};
pub use models::{DateRange, Event, EventDraft, Policy, SearchCriteria};
pub use query::{check_connection, search, QueryExecutor};
pub use store::{EventStore, OrderBy, RestStore, SqliteStore, StoreError};
pub use submit::{SubmissionPipeline, SubmissionState};
pub use validate::{Validation, Validator};

/// Opens the store the config points at. Callers own the returned handle.
pub fn connect(config: &AppConfig) -> Result<Box<dyn EventStore>, ListingError> {
    let store: Box<dyn EventStore> = match config.backend {
        Backend::Sqlite => {
            let opened = match &config.database_path {
                Some(path) => SqliteStore::open(path),
                None => SqliteStore::open_default(),
            };
            Box::new(opened.map_err(|e| ListingError::Connectivity(e.to_string()))?)
        }
        Backend::Rest => {
            let url = config.rest_url.as_deref().unwrap_or_default();
            let key = config.rest_api_key.as_deref().unwrap_or_default();
            Box::new(RestStore::new(url, key).map_err(|e| ListingError::Connectivity(e.to_string()))?)
        }
    };
    Ok(store)
}

#[derive(Parser)]
#[command(name = "show-listings")]
#[command(about = "Search and submit local live-entertainment listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search events by city, artist, venue and date range
    Search {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        /// First day of the range, inclusive (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
    /// Submit a new event
    Submit {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        venue: String,
        #[arg(long)]
        city: String,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Flyer image URL
        #[arg(long)]
        flyer: Option<String>,
    },
    /// Check the event store is reachable
    Check,
    /// Save store settings to the config file
    Configure {
        #[arg(long)]
        backend: Option<Backend>,
        #[arg(long)]
        database: Option<std::path::PathBuf>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        require_ordered_range: Option<bool>,
        #[arg(long)]
        reject_past_dates: Option<bool>,
    },
}

pub fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "show_listings_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_store = ConfigStore::load();

    match cli.command {
        Commands::Search {
            city,
            artist,
            venue,
            from,
            to,
        } => {
            let config = config_store.read().with_env_overrides();
            let store = connect(&config)?;
            check_connection(store.as_ref())?;

            let criteria = SearchCriteria {
                city,
                artist,
                venue,
                date_range: from.zip(to).map(|(start, end)| DateRange::new(start, end)),
            };
            let events = search(store.as_ref(), config.policy(), &criteria)?;
            print!("{}", render_events(&events));
        }
        Commands::Submit {
            artist,
            venue,
            city,
            date,
            flyer,
        } => {
            let config = config_store.read().with_env_overrides();
            let store = connect(&config)?;
            check_connection(store.as_ref())?;

            let draft = EventDraft {
                artist_name: artist,
                venue_name: venue,
                city,
                event_date: date,
                flyer_url: flyer,
            };
            println!("{}", submit_event(store.as_ref(), config.policy(), draft)?);
        }
        Commands::Check => {
            let config = config_store.read().with_env_overrides();
            let store = connect(&config)?;
            check_connection(store.as_ref())?;
            println!("Event store connected ({:?})", config.backend);
        }
        Commands::Configure {
            backend,
            database,
            url,
            key,
            require_ordered_range,
            reject_past_dates,
        } => {
            let updated = config_store
                .update(|config| {
                    if let Some(backend) = backend {
                        config.backend = backend;
                    }
                    if database.is_some() {
                        config.database_path = database;
                    }
                    if url.is_some() {
                        config.rest_url = url;
                    }
                    if key.is_some() {
                        config.rest_api_key = key;
                    }
                    if let Some(flag) = require_ordered_range {
                        config.require_ordered_range = flag;
                    }
                    if let Some(flag) = reject_past_dates {
                        config.reject_past_dates = flag;
                    }
                })
                .map_err(|err| anyhow!("failed to save config: {err}"))?;
            println!("Saved config (backend: {:?})", updated.backend);
        }
    }

    Ok(())
}

/// Runs one submission and returns the confirmation line. Errors carry every
/// validation reason.
fn submit_event(store: &dyn EventStore, policy: Policy, draft: EventDraft) -> Result<String> {
    let event = SubmissionPipeline::new(store, policy).submit(draft)?;
    Ok(format!(
        "Event submitted: {} on {}",
        event.title(),
        event.event_date
    ))
}

/// Plain-text listing used by the binary.
pub fn render_events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found. Try different filters.\n".to_string();
    }

    let mut out = String::new();
    for event in events {
        out.push_str(&format!("### {}\n", event.title()));
        out.push_str(&format!("{}, {}\n", event.venue_name, event.city));
        out.push_str(&format!("{}\n", event.event_date.format("%Y-%m-%d")));
        if let Some(flyer) = &event.flyer_url {
            out.push_str(&format!("Flyer: {flyer}\n"));
        }
        out.push_str("---\n");
    }
    out
}
