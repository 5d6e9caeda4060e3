//! Logboard Common - Shared wire types for the dashboard client
//!
//! This crate contains the JSON payload definitions exchanged with the
//! log-analyzer server, plus the error taxonomy used by the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete (DNS, connect, timeout, non-2xx)
    #[error("request failed: {0}")]
    Network(String),

    /// The response arrived but is missing or malforms a required field
    #[error("response missing required field `{0}`")]
    MalformedResponse(&'static str),

    /// A detail fetch failed; scoped to one entry so the caller can
    /// render the error in the right place and allow a retry
    #[error("failed to load entry {entry_id}: {reason}")]
    FetchFailure { entry_id: String, reason: String },
}

impl ApiError {
    /// Wrap any error under a detail-fetch failure for `entry_id`
    pub fn for_entry(entry_id: &str, err: ApiError) -> ApiError {
        match err {
            ApiError::FetchFailure { .. } => err,
            other => ApiError::FetchFailure {
                entry_id: entry_id.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// One chart's dataset: parallel label/value arrays, 1:1 by position.
///
/// Labels are not sorted and the label set may change arbitrarily
/// between two payloads for the same chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

impl ChartData {
    pub fn new(labels: Vec<String>, data: Vec<u64>) -> Self {
        Self { labels, data }
    }

    /// Parallel-array invariant: one value per label
    pub fn is_consistent(&self) -> bool {
        self.labels.len() == self.data.len()
    }
}

/// Response to a filter request: a rendered table fragment plus the
/// chart datasets and total count derived from the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResults {
    pub html: String,
    pub status_chart_data: ChartData,
    pub method_chart_data: ChartData,
    pub total_entries: u64,
}

/// Raw deserialization target for a filter response. Fields are
/// optional here so a missing one becomes a `MalformedResponse` with
/// the field name instead of an opaque serde error.
#[derive(Debug, Deserialize)]
pub struct RawFilteredResults {
    pub html: Option<String>,
    pub status_chart_data: Option<ChartData>,
    pub method_chart_data: Option<ChartData>,
    pub total_entries: Option<u64>,
}

impl RawFilteredResults {
    /// Validate that all required fields are present and consistent
    pub fn validate(self) -> Result<FilteredResults, ApiError> {
        let html = self.html.ok_or(ApiError::MalformedResponse("html"))?;
        let status_chart_data = self
            .status_chart_data
            .ok_or(ApiError::MalformedResponse("status_chart_data"))?;
        let method_chart_data = self
            .method_chart_data
            .ok_or(ApiError::MalformedResponse("method_chart_data"))?;
        let total_entries = self
            .total_entries
            .ok_or(ApiError::MalformedResponse("total_entries"))?;

        if !status_chart_data.is_consistent() {
            return Err(ApiError::MalformedResponse("status_chart_data"));
        }
        if !method_chart_data.is_consistent() {
            return Err(ApiError::MalformedResponse("method_chart_data"));
        }

        Ok(FilteredResults {
            html,
            status_chart_data,
            method_chart_data,
            total_entries,
        })
    }
}

/// One query parameter captured on a log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryParameter {
    pub name: String,
    pub value: String,
}

/// Detail record for a single log entry. Immutable once fetched and
/// safe to cache for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDetail {
    pub ip_address: String,
    pub timestamp: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub protocol: Option<String>,
    pub status_code: u16,
    pub response_size: u64,
    pub user_agent: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub parameters: Vec<EntryParameter>,
}
