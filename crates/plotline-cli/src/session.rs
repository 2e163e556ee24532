//! Settings and store connection for a CLI session.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use plotline_core::ImportSettings;
use plotline_store::{RestStore, StoreConfig};

/// Loads import settings from `path`, or the defaults when no file is given.
pub fn load_settings(path: Option<&Path>) -> Result<ImportSettings> {
    match path {
        Some(path) => ImportSettings::load(path)
            .with_context(|| format!("load settings from {}", path.display())),
        None => Ok(ImportSettings::default()),
    }
}

/// Builds the store configuration from the connection flags.
pub fn store_config(url: Option<&str>, key: Option<&str>, timeout_secs: u64) -> Result<StoreConfig> {
    let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
        bail!("no record store configured; pass --store-url or set PLOTLINE_STORE_URL");
    };
    let Some(key) = key.map(str::trim).filter(|key| !key.is_empty()) else {
        bail!("no API key configured; pass --store-key or set PLOTLINE_STORE_KEY");
    };
    if timeout_secs == 0 {
        bail!("--store-timeout must be greater than zero");
    }
    Ok(StoreConfig::new(url, key).with_timeout(Duration::from_secs(timeout_secs)))
}

pub fn connect(url: Option<&str>, key: Option<&str>, timeout_secs: u64) -> Result<RestStore> {
    let config = store_config(url, key, timeout_secs)?;
    RestStore::new(config).context("configure record store")
}

/// Interprets an answer to the commit prompt. Only an explicit yes commits.
pub fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
