//! Official MyAnimeList API v2 client.
//!
//! Authenticates every request with the `X-MAL-CLIENT-ID` header. The
//! ranking endpoint wraps each entry in a `node` object; the detail
//! endpoint carries the rating distribution under `statistics.scores`.

use super::rate_limiter::RateLimiter;
use super::types::{MalAnimeDetail, MalRankingResponse};
use super::{ApiError, RankingSource};
use crate::config::MalConfig;
use crate::models::{AnimeSummary, RatingDistribution, ScoreBucket};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

const CLIENT_ID_HEADER: &str = "X-MAL-CLIENT-ID";
const RANKING_FIELDS: &str = "id,title,mean,rank,popularity,num_scoring_users,rating";
const DETAIL_FIELDS: &str = "id,title,statistics";

/// Client for the official MAL API v2
pub struct MalClient {
    client: Client,
    base_url: String,
    client_id: String,
    page_size: u32,
    max_pages: u32,
    list_limiter: RateLimiter,
    detail_limiter: RateLimiter,
}

impl MalClient {
    /// Create a new client with the given API client id credential
    pub fn new(config: &MalConfig, client_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            client_id,
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
            .header(CLIENT_ID_HEADER, &self.client_id)
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
impl RankingSource for MalClient {
    fn name(&self) -> &'static str {
        "mal"
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn max_pages(&self) -> u32 {
        self.max_pages
    }

    fn output_filename(&self) -> &'static str {
        "mal_top_anime.json"
    }

    async fn fetch_ranked_page(&mut self, limit: u32, offset: u32) -> Result<Vec<AnimeSummary>> {
        self.list_limiter.acquire().await;

        let url = format!(
            "{}/anime/ranking?ranking_type=all&limit={}&offset={}&fields={}",
            self.base_url, limit, offset, RANKING_FIELDS
        );

        let page: MalRankingResponse = self
            .get_json(&url)
            .await
            .with_context(|| format!("Failed to fetch ranking page at offset {}", offset))?;

        Ok(page
            .data
            .into_iter()
            .map(|entry| {
                let node = entry.node;
                AnimeSummary {
                    mal_id: node.id,
                    title: node.title,
                    score: node.mean,
                    scored_by: node.num_scoring_users,
                    rank: node.rank,
                    popularity: node.popularity,
                    rating: node.rating,
                }
            })
            .collect())
    }

    async fn fetch_distribution(&mut self, mal_id: u32) -> Result<Option<RatingDistribution>> {
        self.detail_limiter.acquire().await;

        let url = format!("{}/anime/{}?fields={}", self.base_url, mal_id, DETAIL_FIELDS);

        let detail: MalAnimeDetail = match self.get_json(&url).await {
            Ok(detail) => detail,
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                warn!(mal_id, "Anime not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to fetch details for anime {}", mal_id))
            }
        };

        let Some(stats) = detail.statistics else {
            return Ok(None);
        };
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
        let total = scores.iter().map(|bucket| bucket.votes).sum();

        Ok(Some(RatingDistribution { scores, total }))
    }
}
