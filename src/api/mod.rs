//! Remote content service: article listing, search and trending topics over
//! HTTP/JSON.

mod client;
mod types;

use std::future::Future;

pub use client::{ApiClient, ApiError, TRENDING_LIMIT};
pub use types::{Article, ArticlePage, PageQuery, SearchPage, TrendingTopic};

/// The remote collaborator the feed controller and search engine read from.
///
/// Implemented by [`ApiClient`] in production and by scripted fakes in tests.
pub trait ContentService: Send + Sync {
    /// Fetch one page of articles at `query.offset`.
    fn fetch_page(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = Result<ArticlePage, ApiError>> + Send;

    /// Full-text search returning at most `limit` results in service order.
    fn search(
        &self,
        q: &str,
        limit: usize,
    ) -> impl Future<Output = Result<SearchPage, ApiError>> + Send;
}

impl ContentService for ApiClient {
    fn fetch_page(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = Result<ArticlePage, ApiError>> + Send {
        ApiClient::fetch_page(self, query)
    }

    fn search(
        &self,
        q: &str,
        limit: usize,
    ) -> impl Future<Output = Result<SearchPage, ApiError>> + Send {
        ApiClient::search(self, q, limit)
    }
}
