//! Content source trait and the Graph page-feed client.
//! Untyped collaborator JSON is validated into typed records here, at the
//! adapter boundary.

use adpilot_core::config::{HttpConfig, PlatformConfig};
use adpilot_core::{PipelineError, PipelineResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Read-only access to a page's recent posts and videos.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_posts(&self) -> PipelineResult<Vec<PagePost>>;
    async fn fetch_videos(&self) -> PipelineResult<Vec<PageVideo>>;
}

/// One post from the page feed. Every field is optional on the wire; the
/// selector decides eligibility.
#[derive(Debug, Clone, Deserialize)]
pub struct PagePost {
    pub message: Option<String>,
    pub full_picture: Option<String>,
    pub created_time: Option<String>,
}

/// One uploaded video. `source` is the playable URL; a video without one is
/// not eligible for selection.
#[derive(Debug, Clone, Deserialize)]
pub struct PageVideo {
    pub description: Option<String>,
    pub source: Option<String>,
    pub created_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    error: Option<GraphErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    message: String,
}

/// Parse the Graph timestamp format (`2024-01-01T12:00:00+0000`). Items
/// missing or mangling the field keep their feed position but get the
/// current time.
pub fn parse_created_time(raw: Option<&str>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z").ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Graph API client for page-feed reads.
#[derive(Clone)]
pub struct GraphContentSource {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    page_id: String,
    access_token: String,
}

impl GraphContentSource {
    pub fn new(platform: &PlatformConfig, http_cfg: &HttpConfig) -> PipelineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(http_cfg.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        Ok(Self::with_client(http, platform))
    }

    /// Build from a pre-configured client so the binary can share one
    /// connection pool across collaborators.
    pub fn with_client(http: reqwest::Client, platform: &PlatformConfig) -> Self {
        Self {
            http,
            base_url: platform.base_url.clone(),
            api_version: platform.api_version.clone(),
            page_id: platform.page_id.clone(),
            access_token: platform.access_token.clone(),
        }
    }

    async fn fetch_collection<T: serde::de::DeserializeOwned>(
        &self,
        edge: &str,
        fields: &str,
    ) -> PipelineResult<Vec<T>> {
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url, self.api_version, self.page_id, edge
        );
        debug!(edge, "Fetching page content");

        let response = self
            .http
            .get(&url)
            .query(&[("fields", fields), ("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| PipelineError::ContentFetch(e.to_string()))?;

        let status = response.status();
        let body: PagedResponse<T> = response
            .json()
            .await
            .map_err(|e| PipelineError::ContentFetch(e.to_string()))?;

        // The Graph API reports some failures inside a 200 body.
        if let Some(err) = body.error {
            return Err(PipelineError::ContentFetch(err.message));
        }
        if !status.is_success() {
            return Err(PipelineError::ContentFetch(format!(
                "{edge} fetch returned HTTP {status}"
            )));
        }

        Ok(body.data)
    }
}

#[async_trait]
impl ContentSource for GraphContentSource {
    async fn fetch_posts(&self) -> PipelineResult<Vec<PagePost>> {
        self.fetch_collection("posts", "message,full_picture,created_time")
            .await
    }

    async fn fetch_videos(&self) -> PipelineResult<Vec<PageVideo>> {
        self.fetch_collection("videos", "description,source,created_time")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_created_time_graph_format() {
        let dt = parse_created_time(Some("2024-03-05T09:30:00+0000"));
        assert_eq!(dt.to_rfc3339(), "2024-03-05T09:30:00+00:00");
    }

    #[test]
    fn test_parse_created_time_bad_input_falls_back() {
        let before = Utc::now();
        let dt = parse_created_time(Some("not a timestamp"));
        assert!(dt >= before);
    }
}
