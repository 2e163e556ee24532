//! Tests for plotline-model serialization.

use chrono::{TimeZone, Utc};
use plotline_model::{ErrorKind, NewProject, ProjectPatch, Stage};

fn sample_project() -> NewProject {
    NewProject {
        label: "Clinic extension".to_string(),
        stage: Stage::Wayleave,
        plot_number: Some("123A".to_string()),
        reference_number: "REF-001".to_string(),
        zone: "Z1".to_string(),
        block: "B7".to_string(),
        wayleave_number: "WL-88".to_string(),
        account_number: "ACC-1".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        justification: None,
        escalation_date: None,
    }
}

#[test]
fn stage_serializes_as_storage_key() {
    let json = serde_json::to_value(sample_project()).expect("serialize project");
    assert_eq!(json["stage"], "wayleave");
    assert!(json.get("escalation_date").is_none());
}

#[test]
fn project_deserializes_without_optional_fields() {
    let json = serde_json::to_string(&sample_project()).expect("serialize project");
    let back: NewProject = serde_json::from_str(&json).expect("deserialize project");
    assert_eq!(back, sample_project());
}

#[test]
fn patch_skips_absent_fields() {
    let patch = ProjectPatch {
        stage: Some(Stage::Escalated),
        escalation_date: Some("2024-06-01".to_string()),
        ..ProjectPatch::default()
    };
    let json = serde_json::to_value(&patch).expect("serialize patch");
    let object = json.as_object().expect("object");
    assert_eq!(object.len(), 2);
    assert_eq!(object["stage"], "escalated");
}

#[test]
fn error_kind_display() {
    assert_eq!(ErrorKind::Transport.to_string(), "transport");
    assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
}
