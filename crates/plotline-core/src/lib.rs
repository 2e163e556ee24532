//! Import and reconciliation engine for utility-connection projects.
//!
//! Spreadsheet rows are routed to new projects or to the infrastructure-fee
//! ledger, staged for review, and committed through a [`RecordStore`].
//! Fee status is derived afterwards by matching project plots against the
//! ledger.
//!
//! # Example
//!
//! ```ignore
//! use chrono::Utc;
//! use plotline_core::{BatchCommitter, ImportSettings, MemoryStore, stage_from_store};
//! use plotline_ingest::read_sheet;
//! use tokio_util::sync::CancellationToken;
//!
//! let store = MemoryStore::new();
//! let sheet = read_sheet(path)?;
//! let mut batch = stage_from_store(&store, &sheet.rows, Utc::now()).await?;
//! println!("{} projects, {} ledger rows", batch.counts().projects, batch.counts().infra);
//!
//! let result = BatchCommitter::new(&store, ImportSettings::default())
//!     .commit(&mut batch, &CancellationToken::new())
//!     .await?;
//! ```

mod classify;
mod commit;
mod config;
mod edit;
mod error;
pub mod fields;
mod insights;
mod payment;
mod plot;
mod staging;
mod status;
pub mod store;

// === Error Types ===
pub use error::{ImportError, Result};

// === Configuration ===
pub use config::{
    DEFAULT_IMPORT_TIMEOUT_SECS, DEFAULT_INFRA_CHUNK_SIZE, DEFAULT_PAID_CHUNK_SIZE,
    ImportSettings,
};

// === Normalization ===
pub use plot::{normalize_plot, normalize_plot_cell};
pub use status::{
    classify_status, is_recognized_import_status, normalize_status, recognized_import_statuses,
};

// === Import ===
pub use classify::{Classified, DedupState, DiscardReason, classify_row, parse_timestamp};
pub use commit::{BatchCommitter, CommitOutcome, CommitResult};
pub use staging::{
    DetectedCounts, ImportPhase, StagedImportBatch, stage, stage_from_store, stage_with,
};

// === Fee Status ===
pub use payment::{ProjectView, annotate_fee_status, resolve_paid, search_ledger};

// === Editing ===
pub use edit::{ProjectForm, create_project, delete_project, edit_project};

// === Insights ===
pub use insights::{
    Insight, InsightRequest, InsightsBackend, InsightsError, MAX_INSIGHT_RECORDS,
    generate_insights,
};

// === Store ===
pub use store::{MemoryStore, RecordStore, StoreError, StoreResult};
