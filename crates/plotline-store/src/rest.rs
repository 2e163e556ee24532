//! `RecordStore` over a PostgREST-style HTTP API.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use plotline_core::{RecordStore, StoreError, StoreResult, normalize_plot};
use plotline_model::{
    InfraPaymentRecord, NewProject, PaymentMarkers, ProjectId, ProjectPatch, ProjectRecord,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ConfigError, StoreConfig};
use crate::rows::{InfraRow, MarkerRow, PlotRow, ProjectRow, ReferenceRow};

const PREFER: &str = "Prefer";
const RETURN_ROWS: &str = "return=representation";
const RETURN_NOTHING: &str = "return=minimal";

/// HTTP record store.
///
/// Every call is a single request (or a run of paged requests for whole
/// table reads); nothing is cached between calls.
pub struct RestStore {
    client: Client,
    root: Url,
    api_key: String,
    timeout: Duration,
    page_size: usize,
    projects: String,
    infra: String,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self, ConfigError> {
        let root = config.root()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            root,
            api_key: config.api_key,
            timeout: config.timeout,
            page_size: config.page_size,
            projects: config.projects_table,
            infra: config.infra_table,
        })
    }

    fn url(&self, table: &str, query: &[(&str, &str)]) -> StoreResult<Url> {
        let mut url = self
            .root
            .join(table)
            .map_err(|err| StoreError::Rejected(format!("bad table name {table}: {err}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "store request");
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(|err| self.transport(&err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, body);
        warn!(status = status.as_u16(), kind = %err.kind(), "store request failed");
        Err(err)
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Vec<T>> {
        let response = self.send(request).await?;
        response.json::<Vec<T>>().await.map_err(|err| {
            if err.is_timeout() {
                StoreError::Timeout(self.timeout)
            } else {
                StoreError::Decode(err.to_string())
            }
        })
    }

    /// Reads every row of `table` matching `query`, one page at a time.
    async fn read_all<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> StoreResult<Vec<T>> {
        let limit = self.page_size.to_string();
        let mut all = Vec::new();
        loop {
            let offset = all.len().to_string();
            let mut paged = query.to_vec();
            paged.push(("limit", limit.as_str()));
            paged.push(("offset", offset.as_str()));
            let page: Vec<T> = self
                .rows(self.request(Method::GET, self.url(table, &paged)?))
                .await?;
            let done = page.len() < self.page_size;
            all.extend(page);
            if done {
                return Ok(all);
            }
        }
    }

    fn transport(&self, err: &reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Transport(err.to_string())
        }
    }

    async fn first_project(&self, request: RequestBuilder) -> StoreResult<Option<ProjectRecord>> {
        let rows: Vec<ProjectRow> = self.rows(request).await?;
        rows.into_iter().next().map(ProjectRow::into_record).transpose()
    }
}

/// Maps an HTTP status onto the store error taxonomy.
pub(crate) fn status_error(status: StatusCode, body: String) -> StoreError {
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    match status {
        StatusCode::CONFLICT => StoreError::Conflict(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            StoreError::Transport(message)
        }
        status if status.is_client_error() => StoreError::Rejected(message),
        _ => StoreError::Transport(message),
    }
}

/// PostgREST `in` filter with every value quoted.
pub(crate) fn in_filter(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|value| format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// PostgREST `ilike` filter matching `fragment` anywhere.
pub(crate) fn contains_filter(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("ilike.*{escaped}*")
}

fn eq_filter(id: &ProjectId) -> String {
    format!("eq.{id}")
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list_projects(&self) -> StoreResult<Vec<ProjectRecord>> {
        let rows: Vec<ProjectRow> = self
            .read_all(
                &self.projects,
                &[("select", "*"), ("order", "created_at.desc")],
            )
            .await?;
        rows.into_iter().map(ProjectRow::into_record).collect()
    }

    async fn get_project(&self, id: &ProjectId) -> StoreResult<Option<ProjectRecord>> {
        let filter = eq_filter(id);
        let url = self.url(&self.projects, &[("select", "*"), ("id", filter.as_str())])?;
        self.first_project(self.request(Method::GET, url)).await
    }

    async fn insert_project(&self, project: &NewProject) -> StoreResult<ProjectRecord> {
        let url = self.url(&self.projects, &[("select", "*")])?;
        let request = self
            .request(Method::POST, url)
            .header(PREFER, RETURN_ROWS)
            .json(project);
        self.first_project(request)
            .await?
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<ProjectRecord> {
        let filter = eq_filter(id);
        let url = self.url(&self.projects, &[("select", "*"), ("id", filter.as_str())])?;
        let request = self
            .request(Method::PATCH, url)
            .header(PREFER, RETURN_ROWS)
            .json(patch);
        self.first_project(request)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete_project(&self, id: &ProjectId) -> StoreResult<()> {
        let filter = eq_filter(id);
        let url = self.url(&self.projects, &[("select", "id"), ("id", filter.as_str())])?;
        let request = self.request(Method::DELETE, url).header(PREFER, RETURN_ROWS);
        let deleted: Vec<serde_json::Value> = self.rows(request).await?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn reference_numbers(&self) -> StoreResult<BTreeSet<String>> {
        let rows: Vec<ReferenceRow> = self
            .read_all(
                &self.projects,
                &[("select", "reference_number"), ("order", "reference_number")],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.reference_number)
            .filter(|reference| !reference.is_empty())
            .collect())
    }

    async fn infra_plot_numbers(&self) -> StoreResult<BTreeSet<String>> {
        let rows: Vec<PlotRow> = self
            .read_all(
                &self.infra,
                &[("select", "plot_number"), ("order", "plot_number")],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.plot_number)
            .map(|plot| normalize_plot(&plot))
            .filter(|plot| !plot.is_empty())
            .collect())
    }

    async fn insert_infra_payments(&self, rows: &[InfraPaymentRecord]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = self.url(&self.infra, &[])?;
        let request = self
            .request(Method::POST, url)
            .header(PREFER, RETURN_NOTHING)
            .json(rows);
        self.send(request).await?;
        Ok(())
    }

    async fn payment_markers(&self, plots: &[String]) -> StoreResult<Vec<PaymentMarkers>> {
        if plots.is_empty() {
            return Ok(Vec::new());
        }
        let filter = in_filter(plots);
        let url = self.url(
            &self.infra,
            &[("select", "*"), ("plot_number", filter.as_str())],
        )?;
        let rows: Vec<MarkerRow> = self.rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().map(PaymentMarkers::from).collect())
    }

    async fn search_ledger(&self, fragment: &str) -> StoreResult<Vec<InfraPaymentRecord>> {
        let filter = contains_filter(fragment);
        let rows: Vec<InfraRow> = self
            .read_all(
                &self.infra,
                &[
                    ("select", "*"),
                    ("plot_number", filter.as_str()),
                    ("order", "plot_number"),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(InfraPaymentRecord::from).collect())
    }

    async fn clear_infra_payments(&self) -> StoreResult<u64> {
        // Bulk deletes need a filter; this one matches every row.
        let url = self.url(
            &self.infra,
            &[("select", "plot_number"), ("plot_number", "not.is.null")],
        )?;
        let request = self.request(Method::DELETE, url).header(PREFER, RETURN_ROWS);
        let removed: Vec<serde_json::Value> = self.rows(request).await?;
        Ok(removed.len() as u64)
    }
}
