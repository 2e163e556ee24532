//! Workflow status classification.
//!
//! The upstream workflow tool reports granular statuses; the table below
//! folds them into the five canonical stages. Matching is on the
//! lower-cased, trimmed text only.

use plotline_model::Stage;

/// Upstream status phrases and the stage each one files under.
///
/// The phrases are also the allow-list of statuses that may create a new
/// project during import.
const STATUS_TABLE: &[(&str, Stage)] = &[
    // In design
    ("assign planning", Stage::InDesign),
    ("site visit", Stage::InDesign),
    ("design", Stage::InDesign),
    ("design approval", Stage::InDesign),
    ("engineer approval", Stage::InDesign),
    ("redesign", Stage::InDesign),
    // GIS
    ("gis", Stage::Gis),
    ("gis capture", Stage::Gis),
    // WL-GSN
    ("wayleave", Stage::Wayleave),
    ("wl-gsn", Stage::Wayleave),
    // USP
    ("usp", Stage::Escalated),
    ("escalated", Stage::Escalated),
    // Passed
    ("passed", Stage::Passed),
    ("completed", Stage::Passed),
];

/// Lower-cases and trims a raw status.
pub fn normalize_status(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Maps a free-text upstream status onto a canonical stage.
///
/// Total: anything not in the table, including `""`, is `InDesign`.
pub fn classify_status(raw: &str) -> Stage {
    lookup(&normalize_status(raw)).unwrap_or(Stage::InDesign)
}

/// Returns true if an already-normalized status may create a project.
pub fn is_recognized_import_status(normalized: &str) -> bool {
    lookup(normalized).is_some()
}

/// All recognized status phrases, in table order.
pub fn recognized_import_statuses() -> impl Iterator<Item = &'static str> {
    STATUS_TABLE.iter().map(|(phrase, _)| *phrase)
}

fn lookup(normalized: &str) -> Option<Stage> {
    STATUS_TABLE
        .iter()
        .find(|(phrase, _)| *phrase == normalized)
        .map(|(_, stage)| *stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_design_phrases() {
        for phrase in [
            "Assign Planning",
            " site visit",
            "DESIGN",
            "Design Approval",
            "engineer approval",
            "Redesign ",
        ] {
            assert_eq!(classify_status(phrase), Stage::InDesign, "{phrase}");
        }
    }

    #[test]
    fn other_buckets() {
        assert_eq!(classify_status("GIS Capture"), Stage::Gis);
        assert_eq!(classify_status("WL-GSN"), Stage::Wayleave);
        assert_eq!(classify_status("USP"), Stage::Escalated);
        assert_eq!(classify_status("Completed"), Stage::Passed);
    }

    #[test]
    fn unknown_defaults_to_in_design() {
        assert_eq!(classify_status(""), Stage::InDesign);
        assert_eq!(classify_status("on hold"), Stage::InDesign);
        assert!(!is_recognized_import_status("on hold"));
        assert!(!is_recognized_import_status(""));
    }

    #[test]
    fn allow_list_is_the_table() {
        assert_eq!(recognized_import_statuses().count(), 14);
        assert!(recognized_import_statuses().all(is_recognized_import_status));
        assert!(is_recognized_import_status("site visit"));
        assert!(!is_recognized_import_status("Site Visit"));
    }
}
