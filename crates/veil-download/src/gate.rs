//! Download gate
//!
//! Mediates every download: resolve the domain, consult its mode, fetch,
//! and record failures on the domain's session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

use veil_mode::ModeStore;
use veil_session::SessionStore;

use crate::error::FetchError;
use crate::fetcher::{FetchRequest, FetchResponse, Fetcher};
use crate::request::DownloadRequest;
use crate::Result;

/// Which fetch failures raise a domain's warning level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningPolicy {
    /// Transport failures and non-success HTTP statuses
    #[default]
    AnyFailure,
    /// Only resolution, connection and transfer failures
    TransportOnly,
}

impl WarningPolicy {
    pub fn counts(&self, error: &FetchError) -> bool {
        match self {
            WarningPolicy::AnyFailure => true,
            WarningPolicy::TransportOnly => matches!(error, FetchError::Transport(_)),
        }
    }
}

/// Redirect hops followed by one download
pub const MAX_REDIRECTS: usize = 5;

enum Hop {
    Done(Option<DownloadOutcome>),
    /// Redirected; the 3xx is the failure reason if the hop limit is hit
    Follow(DownloadRequest, FetchError),
}

/// A completed download; the payload is the fetched bytes, unaltered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub headers: BTreeMap<String, String>,
    pub payload: Vec<u8>,
}

impl From<FetchResponse> for DownloadOutcome {
    fn from(response: FetchResponse) -> Self {
        Self {
            headers: response.headers,
            payload: response.payload,
        }
    }
}

pub struct DownloadGate {
    sessions: SessionStore,
    modes: ModeStore,
    fetcher: Arc<dyn Fetcher>,
    warning_policy: WarningPolicy,
}

impl DownloadGate {
    pub fn new(sessions: SessionStore, modes: ModeStore, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            sessions,
            modes,
            fetcher,
            warning_policy: WarningPolicy::default(),
        }
    }

    pub fn with_warning_policy(mut self, policy: WarningPolicy) -> Self {
        self.warning_policy = policy;
        self
    }

    /// Run one download attempt.
    ///
    /// Redirects are followed hop by hop, up to [`MAX_REDIRECTS`]; every hop
    /// registers and checks the mode of its own domain. `Ok(None)` covers
    /// policy denial and fetch failure alike; `Err` is only returned when the
    /// session store itself fails.
    pub async fn download(&self, request: &DownloadRequest) -> Result<Option<DownloadOutcome>> {
        let mut current = request.clone();
        let mut hops = 0;

        loop {
            match self.attempt(&current).await? {
                Hop::Done(outcome) => return Ok(outcome),
                Hop::Follow(next, _) if hops < MAX_REDIRECTS => {
                    tracing::debug!(
                        from = %current.url(),
                        to = %next.url(),
                        "Following redirect"
                    );
                    hops += 1;
                    current = next;
                }
                Hop::Follow(_, cause) => {
                    self.record_failure(&current, &cause)?;
                    return Ok(None);
                }
            }
        }
    }

    async fn attempt(&self, request: &DownloadRequest) -> Result<Hop> {
        let domain = request.domain();
        let category = request.category();

        let session = self.sessions.ensure(domain)?;

        if !self.modes.check(domain, category).permits() {
            tracing::debug!(
                domain = %domain,
                category = %category,
                "Download denied by mode"
            );
            return Ok(Hop::Done(None));
        }

        let fetch_request = FetchRequest {
            url: request.url().clone(),
            agent: session.agent,
        };

        match self.fetcher.fetch(&fetch_request).await {
            Ok(response) => {
                tracing::debug!(
                    domain = %domain,
                    category = %category,
                    bytes = response.payload.len(),
                    "Download completed"
                );
                Ok(Hop::Done(Some(response.into())))
            }
            Err(FetchError::Redirect { status, location }) => {
                let cause = FetchError::Redirect {
                    status,
                    location: location.clone(),
                };
                match request.redirect(&location) {
                    Ok(next) => Ok(Hop::Follow(next, cause)),
                    Err(_) => {
                        self.record_failure(request, &cause)?;
                        Ok(Hop::Done(None))
                    }
                }
            }
            Err(e) => {
                self.record_failure(request, &e)?;
                Ok(Hop::Done(None))
            }
        }
    }

    /// Log a failed fetch, raising the domain's warning when the policy counts it
    fn record_failure(&self, request: &DownloadRequest, error: &FetchError) -> Result<()> {
        let domain = request.domain();

        if self.warning_policy.counts(error) {
            let session = self.sessions.raise_warning(domain)?;
            tracing::warn!(
                domain = %domain,
                url = %request.url(),
                warning = session.warning,
                error = %error,
                "Download failed"
            );
        } else {
            tracing::warn!(
                domain = %domain,
                url = %request.url(),
                error = %error,
                "Download failed"
            );
        }

        Ok(())
    }

    /// Resolve `locator` and download it; an unresolvable locator yields `None`
    pub async fn download_locator(&self, locator: &str) -> Result<Option<DownloadOutcome>> {
        match DownloadRequest::parse(locator) {
            Ok(request) => self.download(&request).await,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected download request");
                Ok(None)
            }
        }
    }

    /// Download on a background task; the result is sent exactly once.
    pub fn spawn(&self, locator: String) -> oneshot::Receiver<Result<Option<DownloadOutcome>>> {
        let (tx, rx) = oneshot::channel();
        let gate = self.clone();

        tokio::spawn(async move {
            let result = gate.download_locator(&locator).await;
            let _ = tx.send(result);
        });

        rx
    }
}

impl Clone for DownloadGate {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            modes: self.modes.clone(),
            fetcher: Arc::clone(&self.fetcher),
            warning_policy: self.warning_policy,
        }
    }
}
