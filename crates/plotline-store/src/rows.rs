//! Wire rows and their mapping onto the canonical records.
//!
//! Tables created by different generations of the dashboard used either
//! snake_case or camelCase columns, and nullable text everywhere. Both
//! spellings are accepted on read; writes always use snake_case.

use chrono::{DateTime, Utc};
use plotline_core::{StoreError, classify_status, normalize_plot};
use plotline_model::{InfraPaymentRecord, PaymentMarkers, ProjectId, ProjectRecord, Stage};
use serde::Deserialize;

/// Identifiers come back as text or as bigint depending on the table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_project_id(self) -> Result<ProjectId, StoreError> {
        let text = match self {
            RowId::Text(text) => text,
            RowId::Number(number) => number.to_string(),
        };
        ProjectId::new(text).map_err(|err| StoreError::Decode(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectRow {
    id: RowId,
    #[serde(default, alias = "title")]
    label: Option<String>,
    #[serde(default, alias = "status")]
    stage: Option<String>,
    #[serde(default, alias = "plotNumber")]
    plot_number: Option<String>,
    #[serde(default, alias = "referenceNumber")]
    reference_number: Option<String>,
    #[serde(default)]
    zone: Option<String>,
    #[serde(default)]
    block: Option<String>,
    #[serde(default, alias = "wayleaveNumber")]
    wayleave_number: Option<String>,
    #[serde(default, alias = "accountNumber")]
    account_number: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    justification: Option<String>,
    #[serde(default, alias = "escalationDate")]
    escalation_date: Option<String>,
}

impl ProjectRow {
    pub(crate) fn into_record(self) -> Result<ProjectRecord, StoreError> {
        let plot = self.plot_number.as_deref().map(normalize_plot);
        Ok(ProjectRecord {
            id: self.id.into_project_id()?,
            label: self.label.unwrap_or_default(),
            stage: decode_stage(self.stage.as_deref().unwrap_or_default()),
            plot_number: plot.filter(|plot| !plot.is_empty()),
            reference_number: self.reference_number.unwrap_or_default(),
            zone: self.zone.unwrap_or_default(),
            block: self.block.unwrap_or_default(),
            wayleave_number: self.wayleave_number.unwrap_or_default(),
            account_number: self.account_number.unwrap_or_default(),
            created_at: self.created_at,
            justification: self.justification.filter(|text| !text.trim().is_empty()),
            escalation_date: self.escalation_date.filter(|text| !text.trim().is_empty()),
        })
    }
}

/// Storage keys first, then display labels, then upstream status phrases.
fn decode_stage(raw: &str) -> Stage {
    raw.parse::<Stage>()
        .unwrap_or_else(|_| classify_status(raw))
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfraRow {
    #[serde(default, alias = "plotNumber")]
    plot_number: Option<String>,
    #[serde(default, alias = "ownerName")]
    owner_name: Option<String>,
    #[serde(default, alias = "applicationNumber")]
    application_number: Option<String>,
    #[serde(default, alias = "firstPayment", alias = "initialPaymentDate")]
    first_payment: Option<String>,
    #[serde(default, alias = "secondPayment")]
    second_payment: Option<String>,
    #[serde(default, alias = "thirdPayment")]
    third_payment: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: DateTime<Utc>,
}

impl From<InfraRow> for InfraPaymentRecord {
    fn from(row: InfraRow) -> Self {
        InfraPaymentRecord {
            plot_number: normalize_plot(&row.plot_number.unwrap_or_default()),
            owner_name: row.owner_name.unwrap_or_default(),
            application_number: row.application_number.unwrap_or_default(),
            first_payment: row.first_payment.unwrap_or_default(),
            second_payment: row.second_payment.unwrap_or_default(),
            third_payment: row.third_payment.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarkerRow {
    #[serde(default, alias = "plotNumber")]
    plot_number: Option<String>,
    #[serde(default, alias = "firstPayment", alias = "initialPaymentDate")]
    first_payment: Option<String>,
    #[serde(default, alias = "secondPayment")]
    second_payment: Option<String>,
    #[serde(default, alias = "thirdPayment")]
    third_payment: Option<String>,
}

impl From<MarkerRow> for PaymentMarkers {
    fn from(row: MarkerRow) -> Self {
        PaymentMarkers {
            plot_number: normalize_plot(&row.plot_number.unwrap_or_default()),
            first_payment: row.first_payment.unwrap_or_default(),
            second_payment: row.second_payment.unwrap_or_default(),
            third_payment: row.third_payment.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReferenceRow {
    #[serde(default, alias = "referenceNumber")]
    pub(crate) reference_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlotRow {
    #[serde(default, alias = "plotNumber")]
    pub(crate) plot_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_case_project_row_decodes() {
        let row: ProjectRow = serde_json::from_value(json!({
            "id": 42,
            "title": "Clinic",
            "status": "Site Visit",
            "plotNumber": " 123A ",
            "referenceNumber": "REF-001",
            "zone": null,
            "createdAt": "2024-06-01T08:30:00+00:00"
        }))
        .unwrap();
        let record = row.into_record().unwrap();
        assert_eq!(record.id.as_str(), "42");
        assert_eq!(record.label, "Clinic");
        assert_eq!(record.stage, Stage::InDesign);
        assert_eq!(record.plot_number.as_deref(), Some("123A"));
        assert_eq!(record.zone, "");
    }

    #[test]
    fn stage_keys_and_labels_decode() {
        assert_eq!(decode_stage("escalated"), Stage::Escalated);
        assert_eq!(decode_stage("WL-GSN"), Stage::Wayleave);
        assert_eq!(decode_stage("gis capture"), Stage::Gis);
        assert_eq!(decode_stage(""), Stage::InDesign);
    }

    #[test]
    fn null_markers_are_unpaid() {
        let row: MarkerRow = serde_json::from_value(json!({
            "plot_number": "55B",
            "first_payment": null,
            "secondPayment": "  "
        }))
        .unwrap();
        let markers = PaymentMarkers::from(row);
        assert!(!markers.is_fee_paid());
    }
}
