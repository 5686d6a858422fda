//! Find top-ranked anime with a high count of perfect ("10") scores.
//!
//! Queries the official MyAnimeList API v2 (with a client id
//! credential) or the unofficial Jikan API v4 (without), enriches
//! ranked entries with their rating distributions, and reports the
//! entries whose score-10 vote count clears a configured minimum.

pub mod api;
pub mod config;
pub mod finder;
pub mod logging;
pub mod models;
pub mod report;

pub use api::{JikanClient, MalClient, RankingSource};
pub use config::Config;
pub use finder::{AnimeFinder, FinderStats, ProgressObserver, TracingProgress};
pub use models::{AnimeSummary, QualifiedAnime, RatingDistribution, ScoreBucket};
