//! Connection project records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::stage::Stage;

/// Store-assigned project identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyProjectId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A project that has not been persisted yet.
///
/// This is what import stages and what manual entry submits; the store
/// assigns the id on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub label: String,
    pub stage: Stage,
    /// Normalized plot identifier, `None` when the source row had none.
    pub plot_number: Option<String>,
    /// Business key. Unique among projects, enforced by import dedup.
    pub reference_number: String,
    pub zone: String,
    pub block: String,
    pub wayleave_number: String,
    pub account_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_date: Option<String>,
}

impl NewProject {
    /// Checks the save-time invariants enforced by the edit surface.
    pub fn validate(&self) -> Result<()> {
        check_escalation(self.stage, self.escalation_date.as_deref())
    }

    /// Attaches the store-assigned id.
    pub fn into_record(self, id: ProjectId) -> ProjectRecord {
        ProjectRecord {
            id,
            label: self.label,
            stage: self.stage,
            plot_number: self.plot_number,
            reference_number: self.reference_number,
            zone: self.zone,
            block: self.block,
            wayleave_number: self.wayleave_number,
            account_number: self.account_number,
            created_at: self.created_at,
            justification: self.justification,
            escalation_date: self.escalation_date,
        }
    }
}

/// A tracked connection project as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub label: String,
    pub stage: Stage,
    pub plot_number: Option<String>,
    pub reference_number: String,
    pub zone: String,
    pub block: String,
    pub wayleave_number: String,
    pub account_number: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_date: Option<String>,
}

impl ProjectRecord {
    /// Checks the save-time invariants enforced by the edit surface.
    pub fn validate(&self) -> Result<()> {
        check_escalation(self.stage, self.escalation_date.as_deref())
    }
}

/// Partial update for a project.
///
/// Only the fields listed here can ever be edited; identity fields
/// (`id`, `reference_number`, `created_at`) are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wayleave_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_date: Option<String>,
}

impl ProjectPatch {
    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the record as it would look after this patch.
    pub fn apply_to(&self, current: &ProjectRecord) -> ProjectRecord {
        let mut next = current.clone();
        if let Some(label) = &self.label {
            next.label.clone_from(label);
        }
        if let Some(stage) = self.stage {
            next.stage = stage;
        }
        if let Some(plot) = &self.plot_number {
            next.plot_number = Some(plot.clone());
        }
        if let Some(zone) = &self.zone {
            next.zone.clone_from(zone);
        }
        if let Some(block) = &self.block {
            next.block.clone_from(block);
        }
        if let Some(wayleave) = &self.wayleave_number {
            next.wayleave_number.clone_from(wayleave);
        }
        if let Some(account) = &self.account_number {
            next.account_number.clone_from(account);
        }
        if let Some(justification) = &self.justification {
            next.justification = Some(justification.clone());
        }
        if let Some(date) = &self.escalation_date {
            next.escalation_date = Some(date.clone());
        }
        next
    }
}

fn check_escalation(stage: Stage, escalation_date: Option<&str>) -> Result<()> {
    let has_date = escalation_date.is_some_and(|date| !date.trim().is_empty());
    if stage.requires_escalation_date() && !has_date {
        return Err(ModelError::MissingEscalationDate { stage });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stage: Stage) -> ProjectRecord {
        NewProject {
            label: "Shop 4".to_string(),
            stage,
            plot_number: Some("12A".to_string()),
            reference_number: "REF-1".to_string(),
            zone: "North".to_string(),
            block: "B".to_string(),
            wayleave_number: String::new(),
            account_number: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            justification: None,
            escalation_date: None,
        }
        .into_record(ProjectId::new("p-1").unwrap())
    }

    #[test]
    fn project_id_rejects_blank() {
        assert_eq!(ProjectId::new("  "), Err(ModelError::EmptyProjectId));
        assert_eq!(ProjectId::new(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn escalated_without_date_is_invalid() {
        let mut rec = record(Stage::Escalated);
        assert!(rec.validate().is_err());
        rec.escalation_date = Some("   ".to_string());
        assert!(rec.validate().is_err());
        rec.escalation_date = Some("2024-03-01".to_string());
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let current = record(Stage::InDesign);
        let patch = ProjectPatch {
            stage: Some(Stage::Gis),
            zone: Some("South".to_string()),
            ..ProjectPatch::default()
        };
        let next = patch.apply_to(&current);
        assert_eq!(next.stage, Stage::Gis);
        assert_eq!(next.zone, "South");
        assert_eq!(next.label, current.label);
        assert_eq!(next.reference_number, current.reference_number);
        assert!(!patch.is_empty());
        assert!(ProjectPatch::default().is_empty());
    }
}
