// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ocss_replay_core::config::yaml_to_json;
use ocss_replay_core::pool::read_ndjson;
use ocss_replay_core::{
    Benchmark, ClusterConfig, HttpSearchClient, MetricsSummary, Operation, RunnerParams,
    RunnerRegistry, TrackConfig, OCSS_SEARCH_RUNNER,
};
use tracing::info;

/// ocss-replay – replay recorded OCSS searches against Elasticsearch
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay searches, from a track file or a single ad-hoc operation
    Run {
        /// Path to a track YAML file
        #[arg(short, long, conflicts_with_all = ["index", "source_file"])]
        track: Option<PathBuf>,

        /// Cluster URL (overrides the track's cluster.url)
        #[arg(long)]
        host: Option<String>,

        /// Target index for an ad-hoc operation
        #[arg(long, requires = "source_file")]
        index: Option<String>,

        /// NDJSON file of recorded searches for an ad-hoc operation
        #[arg(long, requires = "index")]
        source_file: Option<PathBuf>,

        /// Measured searches; omit to run until the file is exhausted
        #[arg(long)]
        iterations: Option<u64>,

        /// Unmeasured searches before measuring
        #[arg(long)]
        warmup: Option<u64>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Write the JSON report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a recorded-search file or a track without running anything
    Validate {
        /// NDJSON file of recorded searches
        #[arg(long)]
        source_file: Option<PathBuf>,

        /// Path to a track YAML file
        #[arg(short, long)]
        track: Option<PathBuf>,

        /// Convert the track YAML to JSON and print it
        #[arg(long, requires = "track")]
        to_json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up ES_USERNAME / ES_PASSWORD from a .env file if there is one
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ocss_replay={0},ocss_replay_core={0}",
            log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    info!("ocss-replay v{} starting", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Run {
            track,
            host,
            index,
            source_file,
            iterations,
            warmup,
            timeout,
            output,
        } => {
            let track = build_track(track, host, index, source_file, iterations, warmup, timeout)?;
            run_track(track, output.as_deref()).await
        }
        Commands::Validate {
            source_file,
            track,
            to_json,
        } => validate(source_file.as_deref(), track.as_deref(), to_json).await,
    }
}

fn build_track(
    track_path: Option<PathBuf>,
    host: Option<String>,
    index: Option<String>,
    source_file: Option<PathBuf>,
    iterations: Option<u64>,
    warmup: Option<u64>,
    timeout: Option<u64>,
) -> Result<TrackConfig> {
    let mut track = match (track_path, index, source_file) {
        (Some(path), _, _) => {
            info!("Loading track from: {:?}", path);
            TrackConfig::from_yaml_file(&path)
                .with_context(|| format!("Failed to load track {:?}", path))?
        }
        (None, Some(index), Some(source_file)) => {
            let params = RunnerParams { index, source_file };
            let operation = Operation {
                name: format!("{}-{}", OCSS_SEARCH_RUNNER, params.index),
                runner: OCSS_SEARCH_RUNNER.to_string(),
                iterations,
                warmup_iterations: warmup,
                params: params.to_value(),
            };
            TrackConfig::single(ClusterConfig::default(), operation)
        }
        _ => bail!("either --track or both --index and --source-file are required"),
    };

    if let Some(host) = host {
        track.cluster.url = host;
    }
    if timeout.is_some() {
        track.cluster.request_timeout_secs = timeout;
    }
    track.validate()?;
    Ok(track)
}

async fn run_track(mut track: TrackConfig, output: Option<&Path>) -> Result<()> {
    track.cluster.resolve_credentials();

    let client = HttpSearchClient::new(&track.cluster)
        .context("Failed to build HTTP search client")?;

    let mut registry = RunnerRegistry::new();
    ocss_replay_core::register(&mut registry)?;

    let bench = Benchmark::new(registry, Arc::new(client));
    info!(
        "Running {} operation(s) against {}",
        track.operations.len(),
        track.cluster.url
    );

    let results = bench
        .run_track(&track)
        .await
        .context("Benchmark aborted")?;

    for metrics in &results {
        metrics.print_summary();
    }

    let summaries: Vec<MetricsSummary> = results.iter().map(|m| m.summary()).collect();
    let report = serde_json::to_string_pretty(&summaries)?;
    match output {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            eprintln!("✅ Report written to {:?}", path);
        }
        None => println!("{}", report),
    }
    Ok(())
}

async fn validate(source_file: Option<&Path>, track: Option<&Path>, to_json: bool) -> Result<()> {
    if source_file.is_none() && track.is_none() {
        bail!("nothing to validate: pass --source-file and/or --track");
    }

    if let Some(path) = track {
        if to_json {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read track {:?}", path))?;
            println!("{}", yaml_to_json(&yaml)?);
        }
        let track = TrackConfig::from_yaml_file(path)
            .with_context(|| format!("Invalid track {:?}", path))?;
        println!(
            "✅ Track {:?}: {} operation(s) against {}",
            path,
            track.operations.len(),
            track.cluster.url
        );
    }

    if let Some(path) = source_file {
        let entries = read_ndjson(path).await?;
        let missing = entries.iter().filter(|e| e.get("query").is_none()).count();
        println!("✅ {:?}: {} recorded searches", path, entries.len());
        if missing > 0 {
            bail!("{} of {} entries have no 'query' field", missing, entries.len());
        }
    }

    Ok(())
}
