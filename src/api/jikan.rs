//! Jikan API v4 client (unofficial MyAnimeList API).
//!
//! Needs no credential; identifies itself through the User-Agent
//! header. The list endpoint is page-numbered rather than
//! offset-based, and the statistics endpoint reports its own total
//! vote count.

use super::rate_limiter::RateLimiter;
use super::types::{JikanListResponse, JikanStatisticsResponse};
use super::{ApiError, RankingSource};
use crate::config::JikanConfig;
use crate::models::{AnimeSummary, RatingDistribution, ScoreBucket};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("mal-top-finder/", env!("CARGO_PKG_VERSION"));

/// Client for the Jikan API v4
pub struct JikanClient {
    client: Client,
    base_url: String,
    page_size: u32,
    max_pages: u32,
    list_limiter: RateLimiter,
    detail_limiter: RateLimiter,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(config: &JikanConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            list_limiter: RateLimiter::new(
                config.rate_limit.list_requests_per_second,
                config.rate_limit.requests_per_minute,
            ),
            detail_limiter: RateLimiter::new(
                config.rate_limit.detail_requests_per_second,
                config.rate_limit.requests_per_minute,
            ),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(url = %url, "Making API request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl RankingSource for JikanClient {
    fn name(&self) -> &'static str {
        "jikan"
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn output_filename(&self) -> &'static str {
        "jikan_top_anime.json"
    }

    async fn fetch_ranked_page(&mut self, limit: u32, offset: u32) -> Result<Vec<AnimeSummary>> {
        self.list_limiter.acquire().await;

        // Jikan paginates by page number, not offset
        let page_number = if limit > 0 { offset / limit + 1 } else { 1 };
        let url = format!(
            "{}/top/anime?page={}&limit={}",
            self.base_url, page_number, limit
        );

        let page: JikanListResponse = self
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch top anime page {}", page_number))?;

        Ok(page
            .data
            .into_iter()
            .map(|entry| AnimeSummary {
                mal_id: entry.mal_id,
                title: entry.title,
                score: entry.score,
                scored_by: entry.scored_by,
                rank: entry.rank,
                popularity: entry.popularity,
                rating: entry.rating,
            })
            .collect())
    }

    async fn fetch_distribution(&mut self, mal_id: u32) -> Result<Option<RatingDistribution>> {
        self.detail_limiter.acquire().await;

        let url = format!("{}/anime/{}/statistics", self.base_url, mal_id);

        let response: JikanStatisticsResponse = match self.get_json(&url).await {
            Ok(response) => response,
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                warn!(mal_id, "Anime statistics not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to fetch statistics for anime {}", mal_id))
            }
        };

        let stats = response.data;
        if stats.scores.is_empty() {
            return Ok(None);
        }

        let scores: Vec<ScoreBucket> = stats
            .scores
            .iter()
            .map(|entry| ScoreBucket {
                score: entry.score,
                votes: entry.votes,
            })
            .collect();
        let total = if stats.total > 0 {
            stats.total
        } else {
            scores.iter().map(|bucket| bucket.votes).sum()
        };

        Ok(Some(RatingDistribution { scores, total }))
    }
}
