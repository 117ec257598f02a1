//! Resolved download requests

use url::Url;

use veil_mode::Category;

use crate::error::DownloadError;
use crate::Result;

/// A locator resolved to the domain and category the gate decides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: Url,
    domain: String,
    category: Category,
    /// Category was set by the caller rather than inferred from the path
    pinned: bool,
}

impl DownloadRequest {
    pub fn parse(locator: &str) -> Result<Self> {
        let url = Url::parse(locator.trim())
            .map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", locator, e)))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidUrl(format!(
                "unsupported scheme {:?} in {}",
                url.scheme(),
                url
            )));
        }

        let domain = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => return Err(DownloadError::InvalidUrl(format!("missing host in {}", url))),
        };

        let category = Category::from_path(url.path());

        Ok(Self {
            url,
            domain,
            category,
            pinned: false,
        })
    }

    /// Override the inferred category
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self.pinned = true;
        self
    }

    /// Request for a redirect `location`, resolved against this request's URL.
    ///
    /// The target gets its own domain; its category is inferred from the new
    /// path unless this request's category was set explicitly.
    pub fn redirect(&self, location: &str) -> Result<Self> {
        let url = self
            .url
            .join(location.trim())
            .map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", location, e)))?;

        let next = Self::from_url(url)?;
        Ok(if self.pinned {
            next.with_category(self.category)
        } else {
            next
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn category(&self) -> Category {
        self.category
    }
}
