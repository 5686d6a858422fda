//! Enrichment pipeline.
//!
//! Pages through a ranking source, pre-filters candidates on the cheap
//! summary fields, fetches the rating distribution for the survivors,
//! and keeps the anime whose score-10 vote count clears the configured
//! minimum. Network failures are logged and converted to
//! empty-page/skip outcomes here; nothing below the entry point raises.

use crate::api::RankingSource;
use crate::config::FinderConfig;
use crate::models::{AnimeSummary, QualifiedAnime, RatingDistribution, MAX_SCORE};
use tracing::{debug, info, warn};

/// Observer for scan progress.
///
/// The finder reports through this seam instead of printing, so tests
/// can assert on progress without parsing console output.
pub trait ProgressObserver {
    /// One ranking page was fetched.
    fn on_page(&mut self, page: u32, fetched: usize);

    /// A progress milestone: candidates processed and qualified so far.
    fn on_progress(&mut self, processed: usize, qualified: usize);
}

/// Default observer that logs through `tracing`.
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_page(&mut self, page: u32, fetched: usize) {
        info!(page, fetched, "Fetched ranking page");
    }

    fn on_progress(&mut self, processed: usize, qualified: usize) {
        info!(processed, qualified, "Scan progress");
    }
}

/// Statistics for one finder run
#[derive(Debug, Clone, Default)]
pub struct FinderStats {
    pub pages_fetched: usize,
    pub candidates: usize,
    pub prefiltered_out: usize,
    pub detail_fetches: usize,
    pub detail_failures: usize,
    pub qualified: usize,
}

/// The enrichment pipeline, generic over the ranking source
pub struct AnimeFinder<S: RankingSource> {
    source: S,
    config: FinderConfig,
}

impl<S: RankingSource> AnimeFinder<S> {
    pub fn new(source: S, config: FinderConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the full scan: page, pre-filter, enrich, qualify.
    ///
    /// Returns every qualifying anime in discovery order; ranking and
    /// truncation happen later in the reporter.
    pub async fn run(
        &mut self,
        progress: &mut dyn ProgressObserver,
    ) -> (Vec<QualifiedAnime>, FinderStats) {
        let mut stats = FinderStats::default();

        let candidates = self.collect_candidates(progress, &mut stats).await;
        stats.candidates = candidates.len();
        info!(
            source = self.source.name(),
            candidates = stats.candidates,
            "Ranking scan complete, enriching candidates"
        );

        let mut qualified = Vec::new();

        for (idx, summary) in candidates.into_iter().enumerate() {
            let mal_id = summary.mal_id;

            if !self.passes_prefilter(&summary) {
                stats.prefiltered_out += 1;
            } else {
                stats.detail_fetches += 1;
                match self.source.fetch_distribution(mal_id).await {
                    Ok(Some(distribution)) => {
                        if let Some(anime) = self.qualify(summary, distribution) {
                            qualified.push(anime);
                        }
                    }
                    Ok(None) => {
                        debug!(mal_id, "No rating distribution, skipping");
                    }
                    Err(e) => {
                        stats.detail_failures += 1;
                        warn!(mal_id, error = %e, "Failed to fetch distribution, skipping");
                    }
                }
            }

            if self.config.progress_every > 0 && (idx + 1) % self.config.progress_every == 0 {
                progress.on_progress(idx + 1, qualified.len());
            }
        }

        stats.qualified = qualified.len();
        (qualified, stats)
    }

    /// Walk the ranking up to the configured page cap. Stops early on
    /// an empty page or a failed request.
    async fn collect_candidates(
        &mut self,
        progress: &mut dyn ProgressObserver,
        stats: &mut FinderStats,
    ) -> Vec<AnimeSummary> {
        let limit = self.source.page_size();
        let mut all = Vec::new();
        let mut offset = 0;

        for page in 1..=self.source.max_pages() {
            match self.source.fetch_ranked_page(limit, offset).await {
                Ok(batch) if batch.is_empty() => {
                    info!(page, "Empty ranking page, stopping pagination");
                    break;
                }
                Ok(batch) => {
                    stats.pages_fetched += 1;
                    progress.on_page(page, batch.len());
                    all.extend(batch);
                }
                Err(e) => {
                    warn!(page, error = %e, "Failed to fetch ranking page, stopping pagination");
                    break;
                }
            }
            offset += limit;
        }

        all
    }

    /// Cheap checks applied before spending a detail fetch.
    fn passes_prefilter(&self, summary: &AnimeSummary) -> bool {
        let Some(score) = summary.score else {
            return false;
        };
        if score < self.config.min_score {
            return false;
        }
        summary.scored_by.unwrap_or(0) >= self.config.min_scored_by
    }

    /// Build a `QualifiedAnime` if the score-10 bucket clears the
    /// minimum. A missing bucket is non-qualifying, not an error.
    fn qualify(
        &self,
        summary: AnimeSummary,
        distribution: RatingDistribution,
    ) -> Option<QualifiedAnime> {
        let ten_ratings = distribution.votes_for(MAX_SCORE)?;
        if ten_ratings < self.config.min_ten_votes {
            return None;
        }

        let score = summary.score?;
        let total_ratings = summary
            .scored_by
            .filter(|&n| n > 0)
            .unwrap_or(distribution.total);

        Some(QualifiedAnime {
            id: summary.mal_id,
            title: summary.title,
            score,
            ten_ratings,
            total_ratings,
            rank: summary.rank.unwrap_or(0),
            popularity: summary.popularity.unwrap_or(0),
            rating: summary.rating.unwrap_or_else(|| "N/A".to_string()),
            statistics: distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreBucket;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    struct FakeSource {
        pages: Vec<Vec<AnimeSummary>>,
        distributions: HashMap<u32, RatingDistribution>,
        fail_page: Option<usize>,
        fail_details: HashSet<u32>,
        detail_calls: Vec<u32>,
        page_calls: usize,
    }

    impl FakeSource {
        fn new(pages: Vec<Vec<AnimeSummary>>) -> Self {
            Self {
                pages,
                distributions: HashMap::new(),
                fail_page: None,
                fail_details: HashSet::new(),
                detail_calls: Vec::new(),
                page_calls: 0,
            }
        }

        fn with_distribution(mut self, mal_id: u32, ten_votes: u64) -> Self {
            self.distributions.insert(
                mal_id,
                RatingDistribution {
                    scores: vec![
                        ScoreBucket {
                            score: 9,
                            votes: 100,
                        },
                        ScoreBucket {
                            score: 10,
                            votes: ten_votes,
                        },
                    ],
                    total: 100 + ten_votes,
                },
            );
            self
        }
    }

    #[async_trait]
    impl RankingSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn page_size(&self) -> u32 {
            25
        }

        fn max_pages(&self) -> u32 {
            self.pages.len() as u32 + 1
        }

        fn output_filename(&self) -> &'static str {
            "fake.json"
        }

        async fn fetch_ranked_page(
            &mut self,
            _limit: u32,
            _offset: u32,
        ) -> Result<Vec<AnimeSummary>> {
            let page = self.page_calls;
            self.page_calls += 1;

            if self.fail_page == Some(page) {
                return Err(anyhow!("ranking page unavailable"));
            }
            Ok(self.pages.get(page).cloned().unwrap_or_default())
        }

        async fn fetch_distribution(&mut self, mal_id: u32) -> Result<Option<RatingDistribution>> {
            self.detail_calls.push(mal_id);

            if self.fail_details.contains(&mal_id) {
                return Err(anyhow!("detail unavailable for {}", mal_id));
            }
            Ok(self.distributions.get(&mal_id).cloned())
        }
    }

    struct RecordingProgress {
        pages: Vec<(u32, usize)>,
        milestones: Vec<(usize, usize)>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                pages: Vec::new(),
                milestones: Vec::new(),
            }
        }
    }

    impl ProgressObserver for RecordingProgress {
        fn on_page(&mut self, page: u32, fetched: usize) {
            self.pages.push((page, fetched));
        }

        fn on_progress(&mut self, processed: usize, qualified: usize) {
            self.milestones.push((processed, qualified));
        }
    }

    fn summary(mal_id: u32, score: Option<f64>, scored_by: Option<u64>) -> AnimeSummary {
        AnimeSummary {
            mal_id,
            title: format!("Anime {}", mal_id),
            score,
            scored_by,
            rank: Some(mal_id),
            popularity: Some(mal_id),
            rating: Some("PG-13".to_string()),
        }
    }

    fn config() -> FinderConfig {
        FinderConfig {
            min_score: 7.0,
            min_scored_by: 1000,
            min_ten_votes: 35,
            top_n: 100,
            display_limit: 30,
            progress_every: 2,
        }
    }

    #[tokio::test]
    async fn test_prefilter_blocks_detail_fetches() {
        let source = FakeSource::new(vec![vec![
            summary(1, None, Some(5000)),        // no score
            summary(2, Some(6.5), Some(5000)),   // below min_score
            summary(3, Some(8.0), Some(10)),     // too few scoring users
            summary(4, Some(8.0), None),         // unknown scoring users
            summary(5, Some(8.0), Some(5000)),   // passes
        ]])
        .with_distribution(5, 40);

        let mut finder = AnimeFinder::new(source, config());
        let mut progress = RecordingProgress::new();
        let (found, stats) = finder.run(&mut progress).await;

        // Only the passing candidate cost a network call
        assert_eq!(finder.source().detail_calls, vec![5]);
        assert_eq!(stats.prefiltered_out, 4);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 5);
    }

    #[tokio::test]
    async fn test_missing_ten_bucket_does_not_qualify() {
        let mut source =
            FakeSource::new(vec![vec![summary(1, Some(8.0), Some(5000))]]);
        source.distributions.insert(
            1,
            RatingDistribution {
                scores: vec![ScoreBucket {
                    score: 9,
                    votes: 9999,
                }],
                total: 9999,
            },
        );

        let mut finder = AnimeFinder::new(source, config());
        let (found, stats) = finder.run(&mut RecordingProgress::new()).await;

        assert!(found.is_empty());
        assert_eq!(stats.detail_fetches, 1);
    }

    #[tokio::test]
    async fn test_ten_votes_below_minimum_discarded() {
        let source = FakeSource::new(vec![vec![summary(1, Some(8.0), Some(5000))]])
            .with_distribution(1, 34);

        let mut finder = AnimeFinder::new(source, config());
        let (found, _) = finder.run(&mut RecordingProgress::new()).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_detail_failure_skips_and_continues() {
        let mut source = FakeSource::new(vec![vec![
            summary(1, Some(8.0), Some(5000)),
            summary(2, Some(8.5), Some(5000)),
            summary(3, Some(9.0), Some(5000)),
        ]])
        .with_distribution(1, 40)
        .with_distribution(3, 50);
        source.fail_details.insert(2);

        let mut finder = AnimeFinder::new(source, config());
        let (found, stats) = finder.run(&mut RecordingProgress::new()).await;

        let ids: Vec<u32> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(stats.detail_failures, 1);
    }

    #[tokio::test]
    async fn test_absent_distribution_is_silently_excluded() {
        let source = FakeSource::new(vec![vec![
            summary(1, Some(8.0), Some(5000)),
            summary(2, Some(8.5), Some(5000)),
        ]])
        .with_distribution(2, 40);

        let mut finder = AnimeFinder::new(source, config());
        let (found, stats) = finder.run(&mut RecordingProgress::new()).await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
        assert_eq!(stats.detail_failures, 0);
    }

    #[tokio::test]
    async fn test_pagination_stops_on_empty_page() {
        let source = FakeSource::new(vec![
            vec![summary(1, Some(8.0), Some(5000))],
            vec![],
            vec![summary(2, Some(8.0), Some(5000))],
        ])
        .with_distribution(1, 40);

        let mut finder = AnimeFinder::new(source, config());
        let (_, stats) = finder.run(&mut RecordingProgress::new()).await;

        // The page after the empty one is never requested
        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(finder.source().page_calls, 2);
    }

    #[tokio::test]
    async fn test_pagination_stops_on_error() {
        let mut source = FakeSource::new(vec![
            vec![summary(1, Some(8.0), Some(5000))],
            vec![summary(2, Some(8.0), Some(5000))],
        ]);
        source.fail_page = Some(1);
        let source = source.with_distribution(1, 40);

        let mut finder = AnimeFinder::new(source, config());
        let (found, stats) = finder.run(&mut RecordingProgress::new()).await;

        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_progress_milestones() {
        let source = FakeSource::new(vec![vec![
            summary(1, Some(8.0), Some(5000)),
            summary(2, Some(8.0), Some(5000)),
            summary(3, Some(8.0), Some(5000)),
            summary(4, Some(8.0), Some(5000)),
        ]])
        .with_distribution(1, 40)
        .with_distribution(2, 40)
        .with_distribution(3, 40)
        .with_distribution(4, 40);

        let mut finder = AnimeFinder::new(source, config());
        let mut progress = RecordingProgress::new();
        let (_, _) = finder.run(&mut progress).await;

        // progress_every = 2, four candidates processed
        assert_eq!(progress.milestones, vec![(2, 2), (4, 4)]);
        assert_eq!(progress.pages, vec![(1, 4)]);
    }

    #[tokio::test]
    async fn test_results_keep_discovery_order() {
        let source = FakeSource::new(vec![vec![
            summary(3, Some(7.5), Some(5000)),
            summary(1, Some(9.9), Some(5000)),
            summary(2, Some(8.2), Some(5000)),
        ]])
        .with_distribution(1, 40)
        .with_distribution(2, 40)
        .with_distribution(3, 40);

        let mut finder = AnimeFinder::new(source, config());
        let (found, _) = finder.run(&mut RecordingProgress::new()).await;

        // The finder never reorders; ranking happens in the reporter
        let ids: Vec<u32> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
