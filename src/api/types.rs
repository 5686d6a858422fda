//! Wire types for the MAL API v2 and Jikan API v4.
//!
//! These types mirror the JSON the services actually return; the
//! clients convert them into the domain models in `crate::models`.

use serde::Deserialize;

// ===== MyAnimeList official API v2 =====

/// Ranking list response: `data` is an array of `{node: {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MalRankingResponse {
    pub data: Vec<MalRankingEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalRankingEntry {
    pub node: MalAnimeNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalAnimeNode {
    pub id: u32,
    pub title: String,
    pub mean: Option<f64>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub num_scoring_users: Option<u64>,
    pub rating: Option<String>,
}

/// Detail response, requested with the `statistics` field.
#[derive(Debug, Clone, Deserialize)]
pub struct MalAnimeDetail {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub statistics: Option<MalStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalStatistics {
    #[serde(default)]
    pub scores: Vec<MalScoreEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MalScoreEntry {
    pub score: u8,
    pub votes: u64,
}

// ===== Jikan API v4 =====

/// Top-anime list response: flat entries, no `node` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct JikanListResponse {
    pub data: Vec<JikanTopEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanTopEntry {
    pub mal_id: u32,
    pub title: String,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub rating: Option<String>,
}

/// `/anime/{id}/statistics` response.
#[derive(Debug, Clone, Deserialize)]
pub struct JikanStatisticsResponse {
    pub data: JikanStatistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanStatistics {
    #[serde(default)]
    pub scores: Vec<JikanScoreEntry>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanScoreEntry {
    pub score: u8,
    pub votes: u64,
}
