//! Session Store
//!
//! Write-through registry of session records, keyed by domain.
//! All mutations are serialized on one lock and persisted before they
//! become visible in memory.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use veil_storage::{Database, StorageError};

use crate::query::DomainFilter;
use crate::record::{normalize_domain, SessionRecord};
use crate::Result;

#[derive(Default)]
struct Registry {
    /// Domains in registration order
    order: Vec<String>,
    records: HashMap<String, SessionRecord>,
}

impl Registry {
    fn insert(&mut self, record: SessionRecord) {
        if !self.records.contains_key(&record.domain) {
            self.order.push(record.domain.clone());
        }
        self.records.insert(record.domain.clone(), record);
    }

    fn get_record(&self, domain: &str) -> Option<SessionRecord> {
        self.records.get(domain).cloned()
    }
}

pub struct SessionStore {
    registry: Arc<RwLock<Registry>>,
    /// Database for persistence
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            db,
        }
    }

    /// Fill the registry from the database, preserving registration order
    pub fn load(&self) -> Result<usize> {
        let rows = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT domain, agent, tabs, warning FROM sessions ORDER BY seq ASC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })?;

        let mut loaded = Vec::with_capacity(rows.len());
        for (domain, agent, tabs_json, warning) in rows {
            let warning = u32::try_from(warning).map_err(|_| StorageError::Corrupt {
                table: "sessions",
                reason: format!("warning {} out of range for {}", warning, domain),
            })?;

            loaded.push(SessionRecord {
                tabs: serde_json::from_str(&tabs_json)?,
                agent,
                domain,
                warning,
            });
        }

        let count = loaded.len();
        let mut registry = self.registry.write();
        for record in loaded {
            registry.insert(record);
        }

        tracing::info!(sessions = count, "Loaded sessions");

        Ok(count)
    }

    /// Return the record for `domain`, creating a fresh one on first reference
    pub fn ensure(&self, domain: &str) -> Result<SessionRecord> {
        let domain = normalize_domain(domain)?;

        if let Some(record) = self.registry.read().get_record(&domain) {
            return Ok(record);
        }

        let mut registry = self.registry.write();
        self.ensure_locked(&mut registry, &domain)
    }

    /// Read-only lookup; never creates a record
    pub fn get(&self, domain: &str) -> Option<SessionRecord> {
        let domain = normalize_domain(domain).ok()?;
        self.registry.read().get_record(&domain)
    }

    pub fn list_matching(&self, filter: &DomainFilter) -> Vec<SessionRecord> {
        let registry = self.registry.read();

        match filter {
            DomainFilter::All => registry
                .order
                .iter()
                .filter_map(|domain| registry.records.get(domain).cloned())
                .collect(),
            DomainFilter::Exact(domain) => match normalize_domain(domain) {
                Ok(domain) => registry.records.get(&domain).cloned().into_iter().collect(),
                Err(_) => Vec::new(),
            },
        }
    }

    /// Apply `f` to the record for `domain` under the store lock.
    ///
    /// The updated record is persisted before it replaces the cached one, so a
    /// failed write leaves the registry untouched.
    pub fn mutate<F>(&self, domain: &str, f: F) -> Result<SessionRecord>
    where
        F: FnOnce(&mut SessionRecord),
    {
        let domain = normalize_domain(domain)?;

        let mut registry = self.registry.write();
        let mut record = self.ensure_locked(&mut registry, &domain)?;

        f(&mut record);
        record.domain = domain;

        self.save_record(&record)?;
        registry.insert(record.clone());

        Ok(record)
    }

    pub fn attach_tab(&self, domain: &str, tab_id: String) -> Result<SessionRecord> {
        self.mutate(domain, |record| record.add_tab(tab_id))
    }

    pub fn detach_tab(&self, domain: &str, tab_id: &str) -> Result<SessionRecord> {
        self.mutate(domain, |record| record.remove_tab(tab_id))
    }

    pub fn set_agent(&self, domain: &str, agent: Option<String>) -> Result<SessionRecord> {
        self.mutate(domain, |record| record.agent = agent)
    }

    /// Raise the warning level of `domain` by one
    pub fn raise_warning(&self, domain: &str) -> Result<SessionRecord> {
        self.mutate(domain, SessionRecord::raise_warning)
    }

    pub fn len(&self) -> usize {
        self.registry.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_locked(&self, registry: &mut Registry, domain: &str) -> Result<SessionRecord> {
        if let Some(record) = registry.get_record(domain) {
            return Ok(record);
        }

        let record = SessionRecord::new(domain.to_string());
        self.save_record(&record)?;
        registry.insert(record.clone());

        tracing::info!(domain = %domain, "Created session");

        Ok(record)
    }

    /// Upsert keyed on domain so the row keeps its registration sequence
    fn save_record(&self, record: &SessionRecord) -> Result<()> {
        let tabs_json = serde_json::to_string(&record.tabs)?;

        self.db.transaction(|conn| {
            conn.execute(
                "INSERT INTO sessions (domain, agent, tabs, warning, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(domain) DO UPDATE SET
                    agent = excluded.agent,
                    tabs = excluded.tabs,
                    warning = excluded.warning,
                    updated_at = excluded.updated_at",
                rusqlite::params![
                    record.domain,
                    record.agent,
                    tabs_json,
                    i64::from(record.warning),
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;

        Ok(())
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            db: self.db.clone(),
        }
    }
}
