use crate::config::FeedConfig;
use crate::models::FeedItem;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("Malformed feed document: {0}")]
    Format(#[from] quick_xml::DeError),
}

impl FeedError {
    /// Short label used for logs and counters.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::Status { .. } => "status",
            Self::Format(_) => "format",
        }
    }

    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Retrieves raw feed documents.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    /// Creates a client with the configured timeout and user agent.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }

        response
            .text()
            .await
            .map_err(|e| FeedError::from_reqwest(url, e))
    }
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<FeedItem>,
}

/// Extracts the `(title, link)` items of an RSS 2.0 document, with
/// surrounding whitespace removed. Items may be interleaved with other
/// channel elements.
///
/// # Errors
/// Returns [`FeedError::Format`] when the document is not well-formed XML or
/// has no `channel`.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, FeedError> {
    let document: RssDocument = quick_xml::de::from_str(xml)?;
    Ok(document
        .channel
        .items
        .into_iter()
        .map(|item| FeedItem::new(item.title.trim(), item.link.trim()))
        .collect())
}
