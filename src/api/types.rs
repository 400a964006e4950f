use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Article
// ============================================================================

/// Article as delivered by the content service.
///
/// Identity is `id` alone: deduplication, bookmark membership and "already
/// shown" checks never look at any other field. Text fields the service may
/// send as `null` deserialize to empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    /// Raw publish timestamp; see [`Article::published_at`].
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_score: Option<f64>,
}

impl Article {
    /// Parse `publish_date`, accepting RFC 3339 and naive ISO-8601 (read as UTC).
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.publish_date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Requests
// ============================================================================

/// One page request against the article listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

// ============================================================================
// Responses
// ============================================================================

/// A page of the article listing, normalized from either response shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    /// Service-reported total, when the service sent one.
    pub total: Option<u64>,
    /// The service's explicit continuation flag.
    pub has_more: bool,
}

/// Wire shapes accepted from the listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse {
    Paged {
        articles: Vec<Article>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        has_more: bool,
    },
    Bare(Vec<Article>),
}

impl From<ListResponse> for ArticlePage {
    fn from(response: ListResponse) -> Self {
        match response {
            ListResponse::Paged {
                articles,
                total,
                has_more,
            } => ArticlePage {
                articles,
                total,
                has_more,
            },
            // A bare array carries no continuation flag: treat as exhausted
            ListResponse::Bare(articles) => ArticlePage {
                articles,
                total: None,
                has_more: false,
            },
        }
    }
}

/// Search endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Article>,
    #[serde(default)]
    pub total: u64,
}

/// One entry of the trending list: a topic and how many recent articles
/// mention it. Topics double as category filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TrendingTopic {
    #[serde(default, deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_count: u64,
}
