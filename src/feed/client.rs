//! HTTP client for the FPDS ATOM feed

use super::TaskOrderSource;
use super::parser::{FeedPage, parse_feed_page};
use crate::config::{FeedConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use crate::types::RawRecord;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// FPDS ATOM feed client
///
/// Queries `REF_IDV_PIID:"<piid>"` and walks the paged feed until it stops
/// advertising a `next` link. Each page request is retried on transient
/// failures according to [`RetryConfig`].
pub struct FpdsClient {
    http_client: reqwest::Client,
    feed: FeedConfig,
    retry: RetryConfig,
}

impl FpdsClient {
    /// Create a client from feed and retry settings
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(feed: FeedConfig, retry: RetryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(feed.request_timeout)
            .user_agent(feed.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            feed,
            retry,
        })
    }

    /// Fetch and parse one page starting at entry offset `start`
    async fn fetch_page(&self, query: &str, start: usize) -> Result<FeedPage> {
        let start_param = start.to_string();
        let response = self
            .http_client
            .get(&self.feed.base_url)
            .query(&[
                ("FEEDNAME", self.feed.feed_name.as_str()),
                ("q", query),
                ("start", start_param.as_str()),
            ])
            .send()
            .await?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    self.feed.base_url.clone()
                } else {
                    body
                },
            });
        }

        let content = response.text().await?;
        parse_feed_page(&content)
    }
}

#[async_trait]
impl TaskOrderSource for FpdsClient {
    async fn fetch_by_ref_idv(&self, idv_piid: &str) -> Result<Vec<RawRecord>> {
        let query = format!("REF_IDV_PIID:\"{}\"", idv_piid);
        let mut records = Vec::new();
        let mut start = 0;

        for page_number in 1..=self.feed.max_pages {
            let page = with_retry(&self.retry, || self.fetch_page(&query, start)).await?;
            let count = page.records.len();
            debug!(idv_piid, page = page_number, entries = count, "Fetched feed page");

            records.extend(page.records);
            start += count;

            if !page.has_next || count == 0 {
                info!(idv_piid, records = records.len(), "Feed query complete");
                return Ok(records);
            }
        }

        warn!(
            idv_piid,
            max_pages = self.feed.max_pages,
            records = records.len(),
            "Stopped paging at max_pages; results may be incomplete"
        );
        Ok(records)
    }
}
