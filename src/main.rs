use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use teaming_atlas::config::PipelineConfig;
use teaming_atlas::fetch::DEFAULT_FEEDS;
use teaming_atlas::orchestrator::{run_ingest, run_merge, IngestOptions, MergeOptions};

/// Teaming Atlas - maps the human-AI collaboration landscape
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch candidate items from the configured feeds into the candidate store
    Ingest {
        /// Path to the candidate store
        #[arg(long, default_value = "data/candidates.json")]
        candidates: PathBuf,

        /// Politeness delay between feed requests, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
    /// Re-cluster the landscape from existing records plus candidates
    Merge {
        /// Path to the document store (read and rewritten)
        #[arg(long, default_value = "data/landscape.json")]
        store: PathBuf,

        /// Path to the candidate store (optional; absent means re-cluster only)
        #[arg(long, default_value = "data/candidates.json")]
        candidates: PathBuf,

        /// Target cluster count (clamped to min(k, documents, 20))
        #[arg(short, default_value_t = 10)]
        k: usize,

        /// Run the full pipeline and print a sample, but do not write the store
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting teaming_atlas");
    let args = Args::parse();

    match args.command {
        Command::Ingest {
            candidates,
            delay_ms,
        } => {
            let cfg = PipelineConfig::default();
            let opts = IngestOptions {
                candidates_path: candidates,
                delay_ms,
            };
            run_ingest(&opts, &cfg, DEFAULT_FEEDS).await
        }
        Command::Merge {
            store,
            candidates,
            k,
            dry_run,
        } => {
            let cfg = PipelineConfig {
                k,
                ..PipelineConfig::default()
            };
            let opts = MergeOptions {
                store_path: store,
                candidates_path: candidates,
                dry_run,
            };
            run_merge(&opts, &cfg)
        }
    }
}
