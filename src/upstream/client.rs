//! Region-aware base URLs and GraphQL dispatch (SPEC_FULL.md §4.2).

use crate::domain::DataRegion;
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("building reqwest client"),
        }
    }

    pub fn base_url(region: DataRegion) -> &'static str {
        match region {
            DataRegion::Us => "https://leetcode.com",
            DataRegion::Cn => "https://leetcode.cn",
        }
    }

    pub fn contest_info_url(region: DataRegion, title_slug: &str) -> String {
        let seg = match region {
            DataRegion::Us => "com",
            DataRegion::Cn => "cn",
        };
        format!(
            "{}/{}/contest/api/info/{}/",
            Self::base_url(region),
            seg,
            title_slug
        )
    }

    pub fn ranking_page_url(region: DataRegion, title_slug: &str, page: u32) -> String {
        let seg = match region {
            DataRegion::Us => "com",
            DataRegion::Cn => "cn",
        };
        format!(
            "{}/{}/contest/api/ranking/{}/?pagination={}&region=global",
            Self::base_url(region),
            seg,
            title_slug,
            page
        )
    }

    pub fn graphql_url(region: DataRegion) -> String {
        match region {
            DataRegion::Us => format!("{}/graphql/", Self::base_url(region)),
            DataRegion::Cn => format!("{}/graphql/noj-go/", Self::base_url(region)),
        }
    }

    /// Fetches a URL and returns the raw JSON body, classifying any
    /// non-success response as a transient error (SPEC_FULL.md §4.1's Fetch
    /// Queue retries these).
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, PipelineError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Transient(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Transient(format!(
                "{url} returned {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Fetches a URL and returns the raw text body (used for HTML scraping,
    /// SPEC_FULL.md §4.2's supplemented homepage-scrape adapter).
    pub async fn get_text(&self, url: &str) -> Result<String, PipelineError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Transient(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Transient(format!(
                "{url} returned {}",
                resp.status()
            )));
        }
        resp.text()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Posts a GraphQL query and returns the `data` field of the response.
    pub async fn post_graphql(
        &self,
        region: DataRegion,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, PipelineError> {
        let url = Self::graphql_url(region);
        let body = serde_json::json!({ "query": query, "variables": variables });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Transient(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PipelineError::Transient(format!(
                "{url} returned {}",
                resp.status()
            )));
        }
        let mut payload: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))?;
        Ok(payload["data"].take())
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}
