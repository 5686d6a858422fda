//! API clients for the ranking services.
//!
//! Two services expose the same capability: a paginated top-anime list
//! and a per-anime rating distribution. `RankingSource` is the seam
//! between them and the finder pipeline; the entry point picks an
//! implementation based on credential availability.

pub mod jikan;
pub mod mal;
pub mod rate_limiter;
pub mod types;

pub use jikan::JikanClient;
pub use mal::MalClient;
pub use rate_limiter::RateLimiter;

use crate::models::{AnimeSummary, RatingDistribution};
use anyhow::Result;
use async_trait::async_trait;

/// Classified client failure, wrapped in `anyhow::Error` at call sites.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("transport error for {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A source of globally-ranked anime plus per-anime rating
/// distributions.
#[async_trait]
pub trait RankingSource {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Largest page the service will return.
    fn page_size(&self) -> u32;

    /// Number of ranking pages to walk before stopping.
    fn max_pages(&self) -> u32;

    /// Filename the report is persisted under.
    fn output_filename(&self) -> &'static str;

    /// Fetch one page of the global ranking. An empty page means the
    /// ranking is exhausted; callers stop paging on empty or on error.
    async fn fetch_ranked_page(&mut self, limit: u32, offset: u32) -> Result<Vec<AnimeSummary>>;

    /// Fetch the rating distribution for one anime. `Ok(None)` when the
    /// service has no statistics for the id; callers skip the candidate.
    async fn fetch_distribution(&mut self, mal_id: u32) -> Result<Option<RatingDistribution>>;
}
