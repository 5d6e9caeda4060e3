//! HTTP client for the log-analyzer server

use crate::filter::FilterState;
use async_trait::async_trait;
use logboard_common::{ApiError, EntryDetail, FilteredResults, RawFilteredResults};
use reqwest::Client;
use std::time::Duration;

/// Query marker telling the server to return the partial JSON payload
/// instead of a full dashboard page. Wire-level only; it never appears
/// in the visible address history.
const PARTIAL_MARKER: (&str, &str) = ("ajax", "1");

/// Header identifying the request as programmatic
const REQUESTED_WITH: &str = "XMLHttpRequest";

/// Source of entry detail records.
///
/// The fetcher works against this seam so the network can be swapped
/// out under test; `DashboardClient` is the production implementation.
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch(&self, entry_id: &str) -> Result<EntryDetail, ApiError>;
}

/// Client for the dashboard's filter and detail endpoints
#[derive(Clone)]
pub struct DashboardClient {
    base_url: String,
    client: Client,
}

impl DashboardClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            base_url: server_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.base_url
    }

    /// The query pairs actually sent for a filter request: the
    /// serialized filter state plus the partial-request marker.
    pub(crate) fn request_pairs(state: &FilterState) -> Vec<(String, String)> {
        let mut pairs = state.to_query_pairs();
        pairs.push((PARTIAL_MARKER.0.to_string(), PARTIAL_MARKER.1.to_string()));
        pairs
    }

    /// Apply a filter: GET the dashboard endpoint for `file_id` with
    /// the serialized state and parse the partial payload.
    pub async fn filtered(
        &self,
        file_id: u64,
        state: &FilterState,
    ) -> Result<FilteredResults, ApiError> {
        let url = format!("{}/dashboard/{}/", self.base_url, file_id);
        let pairs = Self::request_pairs(state);

        tracing::debug!(%url, params = pairs.len(), "issuing filter request");

        let response = self
            .client
            .get(&url)
            .header("X-Requested-With", REQUESTED_WITH)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Network(format!(
                "server returned {}",
                response.status()
            )));
        }

        let raw: RawFilteredResults = response
            .json()
            .await
            .map_err(|_| ApiError::MalformedResponse("body"))?;

        raw.validate()
    }
}

#[async_trait]
impl DetailSource for DashboardClient {
    async fn fetch(&self, entry_id: &str) -> Result<EntryDetail, ApiError> {
        let url = format!("{}/log-entry/{}/", self.base_url, entry_id);

        tracing::debug!(%url, "fetching entry detail");

        let response = self
            .client
            .get(&url)
            .header("X-Requested-With", REQUESTED_WITH)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Network(format!(
                "server returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|_| ApiError::MalformedResponse("body"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_pairs_append_marker() {
        let state = FilterState {
            status_code: Some(404),
            ..Default::default()
        };

        let pairs = DashboardClient::request_pairs(&state);
        assert_eq!(
            pairs,
            vec![
                ("status_code".to_string(), "404".to_string()),
                ("ajax".to_string(), "1".to_string()),
            ]
        );

        // The marker is transport-level: the visible address never has it
        assert!(!state.visible_query().contains("ajax"));
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = DashboardClient::new("http://localhost:8000/");
        assert_eq!(client.server_url(), "http://localhost:8000");
    }
}
