//! Ranking, console rendering, and JSON persistence of results.

use crate::models::QualifiedAnime;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Sort by mean score descending and keep the best `top_n`.
///
/// The sort is stable: equal scores keep their discovery order, so
/// repeated runs over identical input produce identical reports.
pub fn rank(mut items: Vec<QualifiedAnime>, top_n: usize) -> Vec<QualifiedAnime> {
    items.sort_by(|a, b| b.score.total_cmp(&a.score));
    items.truncate(top_n);
    items
}

/// Print the ranked report to stdout, capped at `display_limit` rows.
pub fn render(items: &[QualifiedAnime], display_limit: usize) {
    println!("\n{}", "=".repeat(100));
    println!(
        "TOP {} ANIME WITH HIGHEST SCORES (minimum '10' ratings applied)",
        items.len()
    );
    println!("{}", "=".repeat(100));

    for (i, anime) in items.iter().take(display_limit).enumerate() {
        println!("\n{:3}. {}", i + 1, anime.title);
        println!(
            "     Score: {:.2} | 10 Ratings: {} | Total Ratings: {}",
            anime.score, anime.ten_ratings, anime.total_ratings
        );
        println!(
            "     Rank: #{} | Popularity: #{} | Rating: {}",
            anime.rank, anime.popularity, anime.rating
        );
    }

    if items.len() > display_limit {
        println!("\n... and {} more", items.len() - display_limit);
    }
}

/// Print run summary statistics, or the empty-set message.
pub fn summarize(items: &[QualifiedAnime]) {
    if items.is_empty() {
        println!("\nNo anime found matching the criteria.");
        return;
    }

    let avg_score = items.iter().map(|a| a.score).sum::<f64>() / items.len() as f64;
    let avg_ten =
        items.iter().map(|a| a.ten_ratings).sum::<u64>() as f64 / items.len() as f64;

    println!("\nSUMMARY:");
    println!("Average Score: {:.2}", avg_score);
    println!("Average '10' Ratings per Anime: {:.0}", avg_ten);
    println!("Total Anime Found: {}", items.len());
}

/// Write the full result set (not just the displayed rows) as
/// pretty-printed UTF-8 JSON. Failure here is fatal: the scan's output
/// would otherwise be lost.
pub fn persist(items: &[QualifiedAnime], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(items).context("Failed to serialize results")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    info!(path = %path.display(), count = items.len(), "Results saved");
    Ok(())
}
