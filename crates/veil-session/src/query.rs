//! Read-only projections over the session registry

use serde::{Deserialize, Serialize};

use crate::record::SessionRecord;
use crate::store::SessionStore;

/// Which sessions a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainFilter {
    /// `"*"`: every registered session
    All,
    Exact(String),
}

impl DomainFilter {
    pub fn parse(domain: &str) -> Self {
        match domain.trim() {
            "*" => DomainFilter::All,
            other => DomainFilter::Exact(other.to_string()),
        }
    }
}

/// Inbound query payload, e.g. `{"domain": "*"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionQuery {
    pub domain: String,
}

impl From<SessionQuery> for DomainFilter {
    fn from(query: SessionQuery) -> Self {
        DomainFilter::parse(&query.domain)
    }
}

/// Tagged result wrapper, serialized as `{"type": "Session", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Envelope {
    Session(SessionRecord),
}

pub struct QueryService {
    store: SessionStore,
    /// The domain this client itself represents
    self_domain: String,
}

impl QueryService {
    pub fn new(store: SessionStore, self_domain: String) -> Self {
        Self { store, self_domain }
    }

    /// Sessions matching `filter`; an unknown exact domain yields no results
    pub fn query(&self, filter: &DomainFilter) -> Vec<Envelope> {
        self.store
            .list_matching(filter)
            .into_iter()
            .map(Envelope::Session)
            .collect()
    }

    /// Session of the client's own domain
    pub fn read(&self) -> Option<Envelope> {
        self.store.get(&self.self_domain).map(Envelope::Session)
    }

    pub fn self_domain(&self) -> &str {
        &self.self_domain
    }
}

impl Clone for QueryService {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            self_domain: self.self_domain.clone(),
        }
    }
}
