use once_cell::sync::Lazy;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::{EventStore, OrderBy, StoreError, EVENTS_TABLE};
use crate::filter::Clause;
use crate::models::Event;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("show-listings/0.1")
        .build()
        .expect("http client")
});

/// Hosted `events` table exposed through a PostgREST-style endpoint.
pub struct RestStore {
    table_url: Url,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, StoreError> {
        let base_url = base_url.trim();
        let api_key = api_key.trim();
        if base_url.is_empty() {
            return Err(StoreError::Connection("store URL is required".into()));
        }
        if api_key.is_empty() {
            return Err(StoreError::Connection("store API key is required".into()));
        }

        let table_url = Url::parse(&format!(
            "{}/rest/v1/{EVENTS_TABLE}",
            base_url.trim_end_matches('/')
        ))
        .map_err(|err| StoreError::Connection(err.to_string()))?;

        Ok(Self {
            table_url,
            api_key: api_key.to_string(),
        })
    }

    pub(crate) fn select_url(&self, clauses: &[Clause], order: OrderBy) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for clause in clauses {
                let filter = match clause {
                    Clause::Contains { needle, .. } => format!("ilike.%{needle}%"),
                    Clause::OnOrAfter(_) => format!("gte.{}", clause.value()),
                    Clause::OnOrBefore(_) => format!("lte.{}", clause.value()),
                };
                pairs.append_pair(clause.column(), &filter);
            }
            pairs.append_pair("order", &format!("{}.asc", order.column()));
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn send(&self, request: RequestBuilder) -> Result<String, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|err| StoreError::Connection(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Connection(format!("status {}: {}", status, text)));
        }
        if !status.is_success() {
            return Err(StoreError::Rejected(format!("status {}: {}", status, text)));
        }
        Ok(text)
    }
}

impl EventStore for RestStore {
    fn ping(&self) -> Result<(), StoreError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("limit", "1");
        self.send(CLIENT.get(url))?;
        Ok(())
    }

    fn select(&self, clauses: &[Clause], order: OrderBy) -> Result<Vec<Event>, StoreError> {
        let url = self.select_url(clauses, order);
        debug!(%url, "rest select");
        let body = self.send(CLIENT.get(url))?;
        serde_json::from_str(&body).map_err(|err| StoreError::Decode(err.to_string()))
    }

    fn insert(&self, event: &Event) -> Result<(), StoreError> {
        let request = CLIENT
            .post(self.table_url.clone())
            .header("Prefer", "return=minimal")
            .json(event);
        self.send(request)?;
        Ok(())
    }
}
