//! HTTP record store for plotline.
//!
//! Talks to a PostgREST-style API (tables `projects` and `infra_payments`)
//! and is the only place that knows about the tables' column spellings.
//!
//! # Example
//!
//! ```ignore
//! use plotline_store::{RestStore, StoreConfig};
//!
//! let store = RestStore::new(StoreConfig::new("https://db.example.org/rest/v1", api_key))?;
//! let projects = store.list_projects().await?;
//! ```

mod config;
mod rest;
mod rows;

pub use config::{ConfigError, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT, StoreConfig};
pub use rest::RestStore;
