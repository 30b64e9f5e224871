use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{AppContext, Config, Evaluation, RatingOrchestrator};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// reel-rater - movie rating predictor and similarity explorer
#[derive(Parser)]
#[command(name = "reel-rater")]
#[command(about = "Predict movie ratings and find similar movies", long_about = None)]
struct Cli {
    /// Directory holding the catalog, feature vectors, and model artifacts
    /// (overrides ARTIFACTS_DIR)
    #[arg(short, long)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the rating of a movie and show its most similar movies
    Predict {
        /// Exact catalog title
        #[arg(long)]
        title: String,

        /// Skip poster lookups
        #[arg(long)]
        no_posters: bool,
    },

    /// Rank the movies most similar to a title
    Similar {
        /// Exact catalog title
        #[arg(long)]
        title: String,

        /// Number of similar movies to show
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Print the similarity to every movie in catalog order
        #[arg(long)]
        all: bool,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of evaluations to run
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.artifacts_dir {
        config.artifacts_dir = dir;
    }
    let offline = match &cli.command {
        Commands::Predict { no_posters, .. } => *no_posters,
        _ => true,
    };
    if offline {
        config.tmdb_api_key = None;
    }

    println!("Loading artifacts from {}...", config.artifacts_dir.display());
    let start = Instant::now();
    let context = AppContext::load(&config)
        .await
        .context("Failed to load artifacts")?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        context.index().len(),
        start.elapsed()
    );

    match cli.command {
        Commands::Predict { title, .. } => handle_predict(context, &title).await?,
        Commands::Similar { title, limit, all } => handle_similar(&context, &title, limit, all)?,
        Commands::Search { title } => handle_search(&context, &title)?,
        Commands::Benchmark { requests } => handle_benchmark(context, requests).await?,
    }

    Ok(())
}

/// Handle the 'predict' command
async fn handle_predict(context: AppContext, title: &str) -> Result<()> {
    let orchestrator = RatingOrchestrator::new(context);
    let evaluation = orchestrator.evaluate(title).await?;
    print_evaluation(&evaluation);
    Ok(())
}

/// Handle the 'similar' command
fn handle_similar(context: &AppContext, title: &str, limit: usize, all: bool) -> Result<()> {
    let index = context.index();
    let row = index
        .find_by_title(title)
        .ok_or_else(|| anyhow!("Movie '{}' not found", title))?;

    if all {
        let scores = context.engine.similarity_row(row)?;
        println!("{}", format!("Similarity to '{}':", title).bold().blue());
        for (candidate, score) in index.rows().zip(scores) {
            if let Some(movie) = index.movie(candidate) {
                println!("{:>6} {:+.4}  {}", candidate.get(), score, movie.title);
            }
        }
        return Ok(());
    }

    let ranked = context.engine.top_similar(row, limit)?;
    println!("{}", format!("Movies similar to '{}':", title).bold().blue());
    for (rank, scored) in ranked.iter().enumerate() {
        if let Some(movie) = index.movie(scored.row) {
            println!(
                "{}. {} - Similarity: {:.4}",
                (rank + 1).to_string().green(),
                movie.title,
                scored.score
            );
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(context: &AppContext, title: &str) -> Result<()> {
    let matches = context.index().search_titles(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
        return Ok(());
    }
    for (row, movie) in matches.iter().take(20) {
        println!(
            "{}: {} [TMDB {}] avg {:?}/10",
            row.get(),
            movie.title,
            movie.external_id,
            movie.average_vote
        );
    }
    if matches.len() > 20 {
        println!("  ... and {} more", matches.len() - 20);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(context: AppContext, requests: usize) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }

    let titles: Vec<String> = context.index().titles().map(str::to_string).collect();
    let orchestrator = RatingOrchestrator::new(context);

    // Random titles from the catalog
    let picks: Vec<String> = (0..requests)
        .map(|_| titles[rand::random_range(0..titles.len())].clone())
        .collect();

    let wall_start = Instant::now();
    let mut handles = vec![];
    for title in picks {
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.evaluate(&title).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let wall_time = wall_start.elapsed();

    let total_latency: Duration = timings.iter().sum();
    let avg_latency = total_latency / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print one evaluation: prediction, reference, and the similar movies
fn print_evaluation(evaluation: &Evaluation) {
    println!(
        "{}",
        format!(
            "Predicted Rating for '{}': {}",
            evaluation.title,
            evaluation.predicted_rating_label()
        )
        .bold()
        .blue()
    );
    println!("Actual TMDB Rating: {}", evaluation.reference_rating_label());
    println!("Poster: {}", evaluation.poster.image_url);

    if evaluation.similar.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("Top {} Similar Movies:", evaluation.similar.len()).bold()
    );
    for (rank, movie) in evaluation.similar.iter().enumerate() {
        println!(
            "{}. {} - Similarity: {:.4}",
            (rank + 1).to_string().green(),
            movie.poster.display_title,
            movie.score
        );
        println!("   {}", movie.poster.image_url);
    }
}
