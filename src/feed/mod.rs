//! Task-order retrieval from the FPDS ATOM feed.
//!
//! The batch runner only depends on [`TaskOrderSource`]: one query per IDV
//! PIID, returning every raw entry that references it. [`FpdsClient`] is the
//! HTTP implementation; [`parser`] turns ATOM pages into flattened
//! [`RawRecord`](crate::types::RawRecord)s.

use crate::error::Result;
use crate::types::RawRecord;
use async_trait::async_trait;

mod client;
/// ATOM page flattening
pub mod parser;

pub use client::FpdsClient;
pub use parser::{FeedPage, parse_feed_page};

/// Something that can list all awards referencing an IDV
///
/// Implementations own pagination and retry; callers see one blocking call
/// per vehicle. No date range is applied: the vehicle's whole lifetime is
/// queried.
#[async_trait]
pub trait TaskOrderSource: Send + Sync {
    /// Fetch every raw record whose referenced IDV PIID is `idv_piid`
    ///
    /// # Errors
    ///
    /// Returns the transport or parse error that ended the query. Partial
    /// results are discarded.
    async fn fetch_by_ref_idv(&self, idv_piid: &str) -> Result<Vec<RawRecord>>;
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
