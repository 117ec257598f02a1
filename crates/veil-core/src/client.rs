//! Client state container
//!
//! Owns the process-wide session and mode stores and hands out the services
//! built on top of them.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use veil_download::{DownloadError, DownloadGate, DownloadOutcome, Fetcher, HttpFetcher};
use veil_mode::ModeStore;
use veil_session::{DomainFilter, Envelope, QueryService, SessionStore};
use veil_storage::Database;

use crate::config::Config;
use crate::Result;

pub struct Client {
    config: Config,
    sessions: SessionStore,
    modes: ModeStore,
    queries: QueryService,
    gate: DownloadGate,
}

impl Client {
    /// Client fetching over HTTP with the configured timeout and user agent
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(
            Duration::from_secs(config.fetch_timeout_secs),
            config.user_agent.as_deref(),
        )?;

        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        let db = match &config.profile {
            Some(path) => Database::open(path)?,
            None => Database::open_in_memory()?,
        };

        let sessions = SessionStore::new(db.clone());
        let modes = ModeStore::new(db);
        sessions.load()?;
        modes.load()?;

        // The client's own domain always has a session
        let own = sessions.ensure(&config.self_domain)?;

        let queries = QueryService::new(sessions.clone(), own.domain.clone());
        let gate = DownloadGate::new(sessions.clone(), modes.clone(), fetcher)
            .with_warning_policy(config.warning_policy);

        tracing::info!(
            self_domain = %own.domain,
            sessions = sessions.len(),
            persistent = config.profile.is_some(),
            "Client initialized"
        );

        Ok(Self {
            config,
            sessions,
            modes,
            queries,
            gate,
        })
    }

    // === Download operations ===

    pub async fn download(&self, locator: &str) -> Result<Option<DownloadOutcome>> {
        Ok(self.gate.download_locator(locator).await?)
    }

    /// Start a download and receive its result once it completes
    pub fn spawn_download(
        &self,
        locator: String,
    ) -> oneshot::Receiver<veil_download::Result<Option<DownloadOutcome>>> {
        self.gate.spawn(locator)
    }

    /// Await a spawned download, treating a vanished task as an internal fault
    pub async fn join_download(
        receiver: oneshot::Receiver<veil_download::Result<Option<DownloadOutcome>>>,
    ) -> Result<Option<DownloadOutcome>> {
        let result = receiver.await.map_err(|_| DownloadError::Dropped)?;
        Ok(result?)
    }

    // === Mode operations ===

    /// Save a `{domain, mode}` payload; `false` when it is malformed
    pub fn save_mode(&self, payload: &serde_json::Value) -> Result<bool> {
        Ok(self.modes.save_payload(payload)?)
    }

    // === Session operations ===

    pub fn query(&self, filter: &DomainFilter) -> Vec<Envelope> {
        self.queries.query(filter)
    }

    /// Session of this client's own domain
    pub fn read(&self) -> Option<Envelope> {
        self.queries.read()
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn modes(&self) -> &ModeStore {
        &self.modes
    }

    pub fn gate(&self) -> &DownloadGate {
        &self.gate
    }

    pub fn self_domain(&self) -> &str {
        self.queries.self_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_client_has_own_session() {
        let client = Client::new(Config::new("Veil.Local".to_string())).unwrap();

        assert_eq!(client.self_domain(), "veil.local");
        assert_eq!(client.sessions().len(), 1);

        let own = client.sessions().get("veil.local").unwrap();
        assert_eq!(own.warning, 0);
        assert!(own.agent.is_none());
    }

    #[test]
    fn test_invalid_self_domain() {
        assert!(Client::new(Config::new("  ".to_string())).is_err());
    }

    #[test]
    fn test_profile_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new("veil.local".to_string());
        config.profile = Some(dir.path().join("profile.db"));

        {
            let client = Client::new(config.clone()).unwrap();
            client.sessions().raise_warning("example.com").unwrap();
            assert!(client
                .save_mode(&serde_json::json!({
                    "domain": "example.com",
                    "mode": { "text": true, "image": false, "audio": false, "video": false, "other": false }
                }))
                .unwrap());
        }

        let client = Client::new(config).unwrap();
        assert_eq!(client.sessions().get("example.com").unwrap().warning, 1);
        assert_eq!(
            client.modes().check("example.com", veil_mode::Category::Image),
            veil_mode::ModeCheck::Denied
        );
        assert_eq!(client.query(&DomainFilter::All).len(), 2);
    }
}
