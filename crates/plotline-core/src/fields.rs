//! Logical field names and the header spellings they resolve from.
//!
//! Lists are ordered most-preferred first. Spellings only need to differ
//! after label compaction (see `plotline_ingest::normalize_label`), so
//! `plot_number`, `Plot Number` and `plotNumber` are one entry.

pub const LABEL: &[&str] = &["title", "label", "projectName", "project", "name"];
pub const STATUS: &[&str] = &["status", "workflowStatus", "currentStatus", "stage"];
pub const PLOT: &[&str] = &["plotNumber", "plot", "plotNo", "parcelNumber", "parcel"];
pub const REFERENCE: &[&str] = &["referenceNumber", "reference", "referenceNo", "refNo", "ref"];
pub const ZONE: &[&str] = &["zone"];
pub const BLOCK: &[&str] = &["block"];
pub const WAYLEAVE: &[&str] = &["wayleaveNumber", "wayleave", "wayleaveNo", "wlNumber"];
pub const ACCOUNT: &[&str] = &["accountNumber", "account", "accountNo"];
pub const CREATED: &[&str] = &[
    "createdAt",
    "creationDate",
    "created",
    "entryDate",
    "dateCreated",
    "date",
];
pub const JUSTIFICATION: &[&str] = &["justification", "justificationNote"];
pub const ESCALATION_DATE: &[&str] = &["escalationDate", "uspDate"];

pub const APPLICATION: &[&str] = &["applicationNumber", "application", "applicationNo", "appNo"];
pub const OWNER: &[&str] = &["ownerName", "owner", "customerName", "name"];
pub const FIRST_PAYMENT: &[&str] = &[
    "initialPaymentDate",
    "initialPayment",
    "firstPaymentDate",
    "firstPayment",
    "firstInstallment",
    "payment1",
];
pub const SECOND_PAYMENT: &[&str] = &[
    "secondPaymentDate",
    "secondPayment",
    "secondInstallment",
    "payment2",
];
pub const THIRD_PAYMENT: &[&str] = &[
    "thirdPaymentDate",
    "thirdPayment",
    "thirdInstallment",
    "finalPayment",
    "payment3",
];
