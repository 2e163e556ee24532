//! Canonical workflow stages.
//!
//! Upstream workflow tools expose many granular statuses; projects are only
//! ever displayed under one of these five coarse stages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five stages a connection project can be filed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Design work in progress (planning, site visit, approvals, redesign).
    #[default]
    InDesign,

    /// Awaiting or undergoing GIS capture.
    Gis,

    /// Wayleave / GSN paperwork.
    Wayleave,

    /// Escalated to USP. Requires an escalation date.
    Escalated,

    /// Approved and closed.
    Passed,
}

impl Stage {
    /// All stages in display order.
    pub const ALL: [Stage; 5] = [
        Stage::InDesign,
        Stage::Gis,
        Stage::Wayleave,
        Stage::Escalated,
        Stage::Passed,
    ];

    /// Stable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::InDesign => "in_design",
            Stage::Gis => "gis",
            Stage::Wayleave => "wayleave",
            Stage::Escalated => "escalated",
            Stage::Passed => "passed",
        }
    }

    /// Label shown on tabs and filters.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::InDesign => "In Design",
            Stage::Gis => "GIS",
            Stage::Wayleave => "WL-GSN",
            Stage::Escalated => "USP",
            Stage::Passed => "Passed",
        }
    }

    /// Returns true if records in this stage must carry an escalation date.
    pub fn requires_escalation_date(&self) -> bool {
        matches!(self, Stage::Escalated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Stage {
    type Err = String;

    /// Parses either the storage key or the display label (case-insensitive).
    ///
    /// This is a strict parse for already-canonical values. Free-text
    /// workflow statuses go through the status classifier instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        match normalized.as_str() {
            "in_design" | "in design" => Ok(Stage::InDesign),
            "gis" => Ok(Stage::Gis),
            "wayleave" | "wl-gsn" => Ok(Stage::Wayleave),
            "escalated" | "usp" => Ok(Stage::Escalated),
            "passed" => Ok(Stage::Passed),
            _ => Err(format!("Unknown stage: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_labels() {
        assert_eq!("in_design".parse::<Stage>().unwrap(), Stage::InDesign);
        assert_eq!("WL-GSN".parse::<Stage>().unwrap(), Stage::Wayleave);
        assert_eq!(" USP ".parse::<Stage>().unwrap(), Stage::Escalated);
        assert!("site visit".parse::<Stage>().is_err());
    }

    #[test]
    fn storage_keys_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn only_escalated_requires_date() {
        let requiring: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(Stage::requires_escalation_date)
            .collect();
        assert_eq!(requiring, vec![Stage::Escalated]);
    }
}
