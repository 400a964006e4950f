use futures::StreamExt;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::types::{ArticlePage, ListResponse, PageQuery, SearchPage, TrendingTopic};
use crate::util::is_local_host;

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

const ARTICLES_PATH: &str = "api/v1/articles";
const SEARCH_PATH: &str = "api/v1/articles/search";
const TRENDING_PATH: &str = "api/v1/trending";

/// The service ranks topics by article count; only the head is shown.
pub const TRENDING_LIMIT: usize = 10;

/// Errors from the remote content service.
///
/// Callers never propagate these past the component that issued the
/// request: every variant means "no data this cycle".
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Body was not one of the accepted JSON shapes
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Configured base URL could not be parsed
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Create a redirect policy with loop detection and limited hops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// HTTP client for the article API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so
/// background tasks take their own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client rooted at `base_url` (e.g. `http://127.0.0.1:8000`).
    ///
    /// No request timeout is configured: failures are whatever the
    /// transport reports.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;

        // Url::join replaces the last segment unless the base ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        if base.scheme() != "https" && !is_local_host(&base) {
            tracing::warn!(base_url = %base, "Using non-HTTPS API base URL");
        }

        let client = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page of the article listing.
    ///
    /// Accepts both the paged object shape and a bare array.
    pub async fn fetch_page(&self, query: &PageQuery) -> Result<ArticlePage, ApiError> {
        let mut url = self.base_url.join(ARTICLES_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("offset", &query.offset.to_string());
            if let Some(category) = &query.category {
                pairs.append_pair("category", category);
            }
        }

        tracing::debug!(
            offset = query.offset,
            limit = query.limit,
            category = ?query.category,
            "Fetching article page"
        );

        let response: ListResponse = self.get_json(url).await?;
        Ok(response.into())
    }

    /// Run a full-text search.
    pub async fn search(&self, q: &str, limit: usize) -> Result<SearchPage, ApiError> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", q)
            .append_pair("limit", &limit.to_string());

        tracing::debug!(query = %q, limit, "Searching articles");

        self.get_json(url).await
    }

    /// Fetch the trending topics, most mentioned first.
    ///
    /// Blank topics are dropped and at most [`TRENDING_LIMIT`] are kept.
    pub async fn trending(&self) -> Result<Vec<TrendingTopic>, ApiError> {
        let url = self.base_url.join(TRENDING_PATH)?;
        tracing::debug!("Fetching trending topics");

        let mut topics: Vec<TrendingTopic> = self.get_json(url).await?;
        topics.retain(|t| !t.topic.trim().is_empty());
        topics.truncate(TRENDING_LIMIT);
        Ok(topics)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
