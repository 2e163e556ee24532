//! Record types for utility-connection projects and the infrastructure-fee ledger.
//!
//! Everything in here is the canonical schema. Store adapters translate
//! to and from it; core logic never sees source-specific column casing.

pub mod error;
pub mod infra;
pub mod project;
pub mod stage;

pub use error::{ErrorKind, ModelError, Result};
pub use infra::{InfraPaymentRecord, PaymentMarkers};
pub use project::{NewProject, ProjectId, ProjectPatch, ProjectRecord};
pub use stage::Stage;
