//! Web search client backed by SerpAPI
//!
//! Issues a single bounded-timeout request and returns the top organic
//! results as title + snippet pairs. Any failure surfaces as a
//! [`FetchError`]; the context builder degrades to no search line.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::live::FetchError;

const BASE_URL: &str = "https://serpapi.com/search.json";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum number of snippets returned per query.
const MAX_RESULTS: usize = 3;

/// One organic search result.
#[derive(Debug, Clone)]
pub struct SearchSnippet {
    pub title: String,
    pub snippet: String,
}

/// Source of web-search snippets, injectable for testing.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Top results in provider relevance order, at most three.
    async fn search(&self, query: &str) -> Result<Vec<SearchSnippet>, FetchError>;
}

/// SerpAPI-backed [`SearchProvider`].
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl SearchClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(SEARCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchSnippet>, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[("q", query), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = res.text().await?;
        let payload: SearchPayload =
            serde_json::from_str(&body).map_err(|e| FetchError::Payload(e.to_string()))?;

        Ok(payload
            .organic_results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|item| SearchSnippet {
                title: item.title,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_parse_caps_at_three() {
        let json = r#"{"organic_results":[
            {"title":"a","snippet":"1"},
            {"title":"b","snippet":"2"},
            {"title":"c","snippet":"3"},
            {"title":"d","snippet":"4"}
        ]}"#;
        let payload: SearchPayload = serde_json::from_str(json).unwrap();
        let snippets: Vec<SearchSnippet> = payload
            .organic_results
            .into_iter()
            .take(MAX_RESULTS)
            .map(|item| SearchSnippet {
                title: item.title,
                snippet: item.snippet,
            })
            .collect();
        assert_eq!(snippets.len(), 3);
        assert_eq!(snippets[0].snippet, "1");
    }

    #[test]
    fn test_payload_parse_missing_results() {
        let payload: SearchPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.organic_results.is_empty());
    }

    #[test]
    fn test_payload_parse_missing_fields() {
        let json = r#"{"organic_results":[{"title":"only title"}]}"#;
        let payload: SearchPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.organic_results[0].snippet, "");
    }
}
