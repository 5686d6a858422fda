//! MAL top-anime finder CLI.

use anyhow::{Context, Result};
use clap::Parser;
use mal_top_finder::api::{JikanClient, MalClient, RankingSource};
use mal_top_finder::config::Config;
use mal_top_finder::finder::{AnimeFinder, TracingProgress};
use mal_top_finder::report;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// MAL API client id; omit to be prompted (empty input uses Jikan)
    #[arg(long)]
    client_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    mal_top_finder::logging::init(&config.logging, args.verbose)?;
    info!("MAL top-anime finder starting");

    std::fs::create_dir_all(config.output_dir())
        .context("Failed to create output directory")?;

    let client_id = match args.client_id {
        Some(id) => id.trim().to_string(),
        None => prompt_client_id()?,
    };

    if client_id.is_empty() {
        info!("No client id provided, using Jikan API");
        let source = JikanClient::new(&config.jikan).context("Failed to create Jikan client")?;
        run_with(source, &config).await
    } else {
        let source =
            MalClient::new(&config.mal, client_id).context("Failed to create MAL client")?;
        run_with(source, &config).await
    }
}

async fn run_with<S: RankingSource>(source: S, config: &Config) -> Result<()> {
    let output_path = config.output_dir().join(source.output_filename());

    let mut finder = AnimeFinder::new(source, config.finder.clone());
    let mut progress = TracingProgress;
    let (found, stats) = finder.run(&mut progress).await;

    info!(
        pages = stats.pages_fetched,
        candidates = stats.candidates,
        prefiltered_out = stats.prefiltered_out,
        detail_fetches = stats.detail_fetches,
        detail_failures = stats.detail_failures,
        qualified = stats.qualified,
        "Scan complete"
    );

    let ranked = report::rank(found, config.finder.top_n);
    report::render(&ranked, config.finder.display_limit);
    report::summarize(&ranked);

    if !ranked.is_empty() {
        report::persist(&ranked, &output_path)?;
        println!("\nResults saved to {}", output_path.display());
    }

    Ok(())
}

fn prompt_client_id() -> Result<String> {
    print!("Enter your MyAnimeList Client ID (leave empty to use Jikan): ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read client id")?;

    Ok(input.trim().to_string())
}
