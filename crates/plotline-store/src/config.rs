//! Connection settings for the REST store.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Per-request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows fetched per page when reading whole tables.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Errors building a [`crate::RestStore`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid store URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("store API key must not be empty")]
    MissingApiKey,

    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Where the store lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// REST root, e.g. `https://example.supabase.co/rest/v1`.
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub projects_table: String,
    pub infra_table: String,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            projects_table: "projects".to_string(),
            infra_table: "infra_payments".to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Parses the base URL, making sure it ends in `/` so table names join
    /// beneath it.
    pub(crate) fn root(&self) -> Result<Url, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        let mut text = self.base_url.trim().to_string();
        if !text.ends_with('/') {
            text.push('/');
        }
        let url = Url::parse(&text).map_err(|err| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(url)
    }
}
