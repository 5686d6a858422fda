//! Data models for the finder pipeline.
//!
//! Every type here is built once during a run and never mutated; the
//! only persisted artifact is the serialized `QualifiedAnime` list.

use serde::{Deserialize, Serialize};

/// Highest score a user can assign on MyAnimeList.
pub const MAX_SCORE: u8 = 10;

/// One ranked anime as returned by a listing endpoint.
///
/// Both services report the same core fields; anything a service may
/// omit is optional here and handled by the pre-filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeSummary {
    pub mal_id: u32,
    pub title: String,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub rating: Option<String>,
}

/// One entry of a rating distribution: how many users assigned `score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub score: u8,
    pub votes: u64,
}

/// Full rating distribution for one anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingDistribution {
    pub scores: Vec<ScoreBucket>,
    pub total: u64,
}

impl RatingDistribution {
    /// Vote count for a given score value, if that bucket exists.
    pub fn votes_for(&self, score: u8) -> Option<u64> {
        self.scores
            .iter()
            .find(|bucket| bucket.score == score)
            .map(|bucket| bucket.votes)
    }
}

/// An anime that passed every threshold.
///
/// Only constructed when the score-10 vote count meets the configured
/// minimum. Field names follow the report file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedAnime {
    pub id: u32,
    pub title: String,
    pub score: f64,
    #[serde(rename = "10_ratings")]
    pub ten_ratings: u64,
    pub total_ratings: u64,
    pub rank: u32,
    pub popularity: u32,
    pub rating: String,
    pub statistics: RatingDistribution,
}
