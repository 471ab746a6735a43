//! taskeval CLI
//!
//! Command-line interface for the taskeval code evaluation service.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use taskeval_api::{ApiConfig, ApiServer};
use taskeval_cache::{CacheConfig, TtlCache};
use taskeval_core::traits::{Evaluator, TaskStore};
use taskeval_core::types::{Evaluation, Task};
use taskeval_evaluator::{LlmEvaluator, OfflineEvaluator};
use taskeval_flight::FlightTracker;
use taskeval_store::MemoryStore;

/// taskeval - AI-assisted code snippet evaluation
#[derive(Parser)]
#[command(name = "taskeval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a local code file
    Evaluate {
        /// Path to the code file
        file: PathBuf,
        /// Programming language of the file
        #[arg(short, long)]
        language: String,
        /// Optional context for the evaluator
        #[arg(short, long)]
        description: Option<String>,
        /// Use the offline heuristic evaluator even when an API key is set
        #[arg(long)]
        offline: bool,
        /// Print the evaluation as JSON instead of a formatted report
        #[arg(long)]
        json: bool,
    },

    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Benchmark the result cache
    Bench {
        /// Number of entries to insert
        #[arg(short, long, default_value = "10000")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "taskeval=debug,info"
    } else {
        "taskeval=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Evaluate {
            file,
            language,
            description,
            offline,
            json,
        } => cmd_evaluate(&file, &language, description, offline, json).await,
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Bench { count } => cmd_bench(count).await,
    }
}

/// Evaluate a local file through the full pipeline
async fn cmd_evaluate(
    file: &PathBuf,
    language: &str,
    description: Option<String>,
    offline: bool,
    json: bool,
) -> Result<()> {
    println!("{} {}", "🧐 Evaluating:".cyan().bold(), file.display());

    let code = std::fs::read_to_string(file).context("Failed to read code file")?;
    let title = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snippet".into());

    let mut task = Task::new(Uuid::new_v4(), title, language, code);
    if let Some(description) = description {
        task = task.with_description(description);
    }

    let evaluator: Arc<dyn Evaluator> = if offline {
        Arc::new(OfflineEvaluator::new())
    } else {
        match LlmEvaluator::from_env() {
            Ok(evaluator) => Arc::new(evaluator),
            Err(_) => {
                println!(
                    "   {}",
                    "TASKEVAL_API_KEY not set, using the offline evaluator".yellow()
                );
                Arc::new(OfflineEvaluator::new())
            }
        }
    };
    println!("   {} {}", "Evaluator:".dimmed(), evaluator.name());

    let store = MemoryStore::new();
    let tracker = FlightTracker::new();

    let task_id = store.create_task(task.clone()).await?;
    let evaluation = tracker
        .run(&task_id.to_string(), async {
            let report = evaluator.evaluate(&task).await?;
            let evaluation = Evaluation::from_report(&task, report);
            store.insert_evaluation(evaluation.clone()).await?;
            Ok(evaluation)
        })
        .await
        .context("Evaluation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    let score_label = format!("{}/100", evaluation.score);
    let score_colored = match evaluation.score {
        80..=100 => score_label.green().bold(),
        50..=79 => score_label.yellow().bold(),
        _ => score_label.red().bold(),
    };
    println!("\n{} {}", "✅ Score:".green().bold(), score_colored);

    if !evaluation.strengths.is_empty() {
        println!("\n{}", "Strengths:".yellow().bold());
        for s in &evaluation.strengths {
            println!("   {} {}", "+".green(), s);
        }
    }

    if !evaluation.improvements.is_empty() {
        println!("\n{}", "Improvements:".yellow().bold());
        for s in &evaluation.improvements {
            println!("   {} {}", "-".red(), s);
        }
    }

    println!("\n{}", "Report:".yellow().bold());
    println!("{}", evaluation.full_report);

    println!("\n{}", "📋 Rewritten code:".yellow().bold());
    println!("{}", evaluation.fixed_code);

    Ok(())
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    println!("{}", "🚀 Starting taskeval API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let config = ApiConfig::from_env();
    let server = ApiServer::new(config);

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

/// Benchmark the result cache
async fn cmd_bench(count: usize) -> Result<()> {
    println!("{} {} entries", "📊 Benchmarking cache with".cyan().bold(), count);

    let cache: TtlCache<String> = TtlCache::with_config(CacheConfig {
        max_entries: (count / 2).max(1),
        ttl_ms: 60_000,
    });

    // Insert (second half continuously evicts the first)
    println!("\n{}", "1. Inserting...".dimmed());
    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let start = std::time::Instant::now();
    for i in 0..count {
        cache.insert(format!("task-{i}"), format!("report-{i}"));
        pb.inc(1);
    }
    pb.finish();
    let insert_time = start.elapsed();
    println!("   ✓ Inserted {} entries: {:?}", count, insert_time);

    // Lookup
    println!("\n{}", "2. Looking up...".dimmed());
    let start = std::time::Instant::now();
    let mut hits = 0usize;
    for i in 0..count {
        if cache.get(&format!("task-{i}")).is_some() {
            hits += 1;
        }
    }
    let lookup_time = start.elapsed();

    let stats = cache.stats();
    let rate = count as f64 / lookup_time.as_secs_f64();

    println!("   ✓ {} lookups: {:?}", count, lookup_time);
    println!("\n{}", "Results:".yellow().bold());
    println!("   {} {}", "Hits:".dimmed(), hits);
    println!("   {} {}", "Live entries:".dimmed(), stats.valid_entries);
    println!("   {} {}", "Capacity:".dimmed(), stats.capacity);
    println!("   {} {:.0} lookups/s", "Rate:".dimmed(), rate);

    Ok(())
}
