//! Contract with the external text generator that writes dashboard insights.
//!
//! The generator is a black box. It receives a bounded JSON sample of
//! records and an optional question, and answers with prose.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Most records ever sent in one request.
pub const MAX_INSIGHT_RECORDS: usize = 50;

/// Error types for insight generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightsError {
    /// No API key or endpoint configured.
    #[error("insights backend is not configured: {0}")]
    MissingCredentials(String),

    /// Request failed in transit or was refused.
    #[error("insights request failed: {0}")]
    Transport(String),
}

/// Request sent to an [`InsightsBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    /// At most [`MAX_INSIGHT_RECORDS`] records, as JSON objects.
    pub records: Vec<Value>,
    pub question: Option<String>,
}

#[async_trait]
pub trait InsightsBackend: Send + Sync {
    async fn generate(&self, request: InsightRequest) -> Result<String, InsightsError>;
}

/// What the dashboard shows in the insights panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "text")]
pub enum Insight {
    Text(String),
    /// Backend not configured.
    Unavailable,
    /// Backend configured but the request failed.
    Failed,
}

impl Insight {
    pub fn as_text(&self) -> &str {
        match self {
            Insight::Text(text) => text,
            Insight::Unavailable => "Insights are unavailable.",
            Insight::Failed => "Insights could not be generated.",
        }
    }
}

/// Asks `backend` about the first [`MAX_INSIGHT_RECORDS`] of `records`.
///
/// Never fails: backend errors collapse into the two sentinels.
pub async fn generate_insights<B, T>(backend: &B, records: &[T], question: Option<&str>) -> Insight
where
    B: InsightsBackend + ?Sized,
    T: Serialize,
{
    let sample: Vec<Value> = records
        .iter()
        .take(MAX_INSIGHT_RECORDS)
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "record skipped from insight sample");
                None
            }
        })
        .collect();
    let request = InsightRequest {
        records: sample,
        question: question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
    };

    match backend.generate(request).await {
        Ok(text) => Insight::Text(text),
        Err(InsightsError::MissingCredentials(reason)) => {
            tracing::info!(%reason, "insights unavailable");
            Insight::Unavailable
        }
        Err(err) => {
            tracing::warn!(error = %err, "insights failed");
            Insight::Failed
        }
    }
}
