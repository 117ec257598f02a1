//! Network retrieval behind the gate

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    /// Sent as `User-Agent` when present
    pub agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Lowercased header names; repeated headers are joined with `", "`
    pub headers: BTreeMap<String, String>,
    pub payload: Vec<u8>,
}

/// Performs the actual retrieval of an already-approved request.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(
        &self,
        request: &FetchRequest,
    ) -> std::result::Result<FetchResponse, FetchError>;
}

/// `Fetcher` backed by a shared `reqwest` client
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Self::builder(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Client settings for an `HttpFetcher`: 3xx answers come back to the
    /// caller as `FetchError::Redirect` instead of being followed.
    pub fn builder(timeout: Duration) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
    }

    /// Wrap a prepared client; it must not follow redirects on its own
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
    ) -> std::result::Result<FetchResponse, FetchError> {
        let mut req = self.client.get(request.url.clone());
        if let Some(agent) = &request.agent {
            req = req.header(reqwest::header::USER_AGENT, agent.as_str());
        }

        let response = req
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_redirection() {
            if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
                return Err(FetchError::Redirect {
                    status: status.as_u16(),
                    location: String::from_utf8_lossy(location.as_bytes()).into_owned(),
                });
            }
        }

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            // Non-UTF-8 bytes are kept as U+FFFD
            let value = String::from_utf8_lossy(value.as_bytes());
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert_with(|| value.to_string());
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();

        Ok(FetchResponse { headers, payload })
    }
}
