//! Mode Store
//!
//! Holds the saved matrix of each domain. A save replaces the whole matrix in
//! one step; readers see either the previous matrix or the new one.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use veil_storage::{domain_key, Database};

use crate::category::Category;
use crate::error::ModeError;
use crate::matrix::{ModeMatrix, ModePayload};
use crate::Result;

/// Outcome of checking one category against a domain's mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCheck {
    Allowed,
    Denied,
    /// No mode was ever saved for the domain
    Absent,
}

impl ModeCheck {
    /// Whether a download may proceed; an absent mode does not restrict
    pub fn permits(&self) -> bool {
        !matches!(self, ModeCheck::Denied)
    }
}

pub struct ModeStore {
    modes: Arc<RwLock<HashMap<String, ModeMatrix>>>,
    /// Database for persistence
    db: Database,
}

impl ModeStore {
    pub fn new(db: Database) -> Self {
        Self {
            modes: Arc::new(RwLock::new(HashMap::new())),
            db,
        }
    }

    /// Fill the cache from the database
    pub fn load(&self) -> Result<usize> {
        let rows = self.db.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT domain, text, image, audio, video, other FROM modes")?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        ModeMatrix {
                            text: row.get(1)?,
                            image: row.get(2)?,
                            audio: row.get(3)?,
                            video: row.get(4)?,
                            other: row.get(5)?,
                        },
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })?;

        let count = rows.len();
        self.modes.write().extend(rows);

        tracing::info!(modes = count, "Loaded modes");

        Ok(count)
    }

    /// Replace the whole matrix for `domain`
    pub fn save(&self, domain: &str, matrix: ModeMatrix) -> Result<()> {
        let domain = normalize_domain(domain)?;

        let mut modes = self.modes.write();
        self.db.transaction(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO modes
                 (domain, text, image, audio, video, other, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    domain,
                    matrix.text,
                    matrix.image,
                    matrix.audio,
                    matrix.video,
                    matrix.other,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;
        modes.insert(domain.clone(), matrix);

        tracing::info!(domain = %domain, mode = ?matrix, "Saved mode");

        Ok(())
    }

    /// Validate and save an untyped payload.
    ///
    /// Returns `Ok(false)` for a malformed payload, leaving the store
    /// unchanged; `Err` is reserved for storage faults.
    pub fn save_payload(&self, payload: &serde_json::Value) -> Result<bool> {
        let payload = match ModePayload::from_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected mode payload");
                return Ok(false);
            }
        };

        match self.save(&payload.domain, payload.mode) {
            Ok(()) => Ok(true),
            Err(ModeError::InvalidDomain(domain)) => {
                tracing::debug!(domain = %domain, "Rejected mode payload");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn check(&self, domain: &str, category: Category) -> ModeCheck {
        let Ok(domain) = normalize_domain(domain) else {
            return ModeCheck::Absent;
        };

        match self.modes.read().get(&domain) {
            None => ModeCheck::Absent,
            Some(matrix) if matrix.allows(category) => ModeCheck::Allowed,
            Some(_) => ModeCheck::Denied,
        }
    }

    pub fn read(&self, domain: &str) -> Option<ModeMatrix> {
        let domain = normalize_domain(domain).ok()?;
        self.modes.read().get(&domain).copied()
    }

    /// Drop the saved mode so the domain is unrestricted again
    pub fn remove(&self, domain: &str) -> Result<bool> {
        let domain = normalize_domain(domain)?;

        let mut modes = self.modes.write();
        let removed = self.db.transaction(|conn| {
            Ok(conn.execute("DELETE FROM modes WHERE domain = ?1", [&domain])?)
        })?;
        modes.remove(&domain);

        if removed > 0 {
            tracing::info!(domain = %domain, "Removed mode");
        }

        Ok(removed > 0)
    }

    /// All saved modes, sorted by domain
    pub fn list(&self) -> Vec<(String, ModeMatrix)> {
        let mut out: Vec<(String, ModeMatrix)> = self
            .modes
            .read()
            .iter()
            .map(|(domain, matrix)| (domain.clone(), *matrix))
            .collect();

        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl Clone for ModeStore {
    fn clone(&self) -> Self {
        Self {
            modes: Arc::clone(&self.modes),
            db: self.db.clone(),
        }
    }
}

fn normalize_domain(domain: &str) -> Result<String> {
    domain_key(domain).ok_or_else(|| ModeError::InvalidDomain(domain.to_string()))
}
