//! Infrastructure-fee ledger rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the independently maintained fee ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraPaymentRecord {
    /// Normalized plot identifier; the sole join key to projects.
    pub plot_number: String,
    pub owner_name: String,
    pub application_number: String,
    pub first_payment: String,
    pub second_payment: String,
    pub third_payment: String,
    pub created_at: DateTime<Utc>,
}

impl InfraPaymentRecord {
    /// The three installment markers of this row.
    pub fn markers(&self) -> PaymentMarkers {
        PaymentMarkers {
            plot_number: self.plot_number.clone(),
            first_payment: self.first_payment.clone(),
            second_payment: self.second_payment.clone(),
            third_payment: self.third_payment.clone(),
        }
    }

    pub fn is_fee_paid(&self) -> bool {
        any_marker_recorded([
            self.first_payment.as_str(),
            self.second_payment.as_str(),
            self.third_payment.as_str(),
        ])
    }
}

/// The narrow projection fetched when resolving payment status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMarkers {
    pub plot_number: String,
    #[serde(default)]
    pub first_payment: String,
    #[serde(default)]
    pub second_payment: String,
    #[serde(default)]
    pub third_payment: String,
}

impl PaymentMarkers {
    /// Fee-paid is derived: any marker non-empty after trimming.
    pub fn is_fee_paid(&self) -> bool {
        any_marker_recorded([
            self.first_payment.as_str(),
            self.second_payment.as_str(),
            self.third_payment.as_str(),
        ])
    }
}

fn any_marker_recorded(markers: [&str; 3]) -> bool {
    markers.iter().any(|marker| !marker.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(first: &str, second: &str, third: &str) -> PaymentMarkers {
        PaymentMarkers {
            plot_number: "55B".to_string(),
            first_payment: first.to_string(),
            second_payment: second.to_string(),
            third_payment: third.to_string(),
        }
    }

    #[test]
    fn whitespace_markers_do_not_count() {
        assert!(!markers("", "  ", "\t").is_fee_paid());
    }

    #[test]
    fn any_single_marker_counts() {
        assert!(markers("2024-01-01", "", "").is_fee_paid());
        assert!(markers("", "paid", "").is_fee_paid());
        assert!(markers("", "", "x").is_fee_paid());
    }

    #[test]
    fn record_and_projection_agree() {
        let record = InfraPaymentRecord {
            plot_number: "55B".to_string(),
            owner_name: "A. Owner".to_string(),
            application_number: "APP-9".to_string(),
            first_payment: String::new(),
            second_payment: "2023-11-02".to_string(),
            third_payment: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert!(record.is_fee_paid());
        assert_eq!(record.markers().is_fee_paid(), record.is_fee_paid());
    }
}
