#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the county data pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use county_compass_cli_utils::{IndicatifProgress, init_logger};
use county_compass_county_models::{CountyRecord, Metric};
use county_compass_pipeline::{DataDirs, build, combine, fill};
use county_compass_scoring::stats;
use county_compass_scoring_models::StatisticsSummary;
use county_compass_source::{FetchOptions, registry};

#[derive(Parser)]
#[command(name = "county_compass_pipeline", about = "County data pipeline")]
struct Cli {
    /// Root data directory holding base/, fill/, and final/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch raw tables from one or all registered sources
    Fetch {
        /// Source identifier (e.g., "`census_population`"); fetches every
        /// source when omitted
        source: Option<String>,
        /// Maximum number of rows per source (for testing)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// List the registered data sources
    Sources,
    /// Merge the six base tables into one combined row per county
    Combine,
    /// Overlay hand-curated estimates onto counties missing a metric
    Fill,
    /// Convert the merged rows into the typed dataset and its manifest
    Build,
    /// Print per-metric statistics for a built dataset
    Stats {
        /// Dataset file; defaults to `<data-dir>/final/dataset.json`
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Validate a built dataset file and report
    Validate {
        /// Dataset file; defaults to `<data-dir>/final/dataset.json`
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();
    let dirs = DataDirs::new(&cli.data_dir);

    match cli.command {
        Commands::Fetch { source, limit } => {
            let sources = match source {
                Some(id) => {
                    let source = registry::source_by_id(&id)
                        .ok_or_else(|| format!("Unknown source: {id}"))?;
                    vec![source]
                }
                None => registry::all_sources(),
            };
            let client = reqwest::Client::builder()
                .user_agent("county-compass/1.0")
                .build()?;
            let options = FetchOptions {
                output_dir: dirs.base.clone(),
                limit,
            };
            for source in &sources {
                let progress = IndicatifProgress::records_bar(&multi, &source.name);
                if let Err(e) = source.run(&client, &options, &progress).await {
                    log::error!("Failed to fetch {}: {e}", source.id);
                }
            }
        }
        Commands::Sources => {
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for source in registry::all_sources() {
                println!("{:<20} {}", source.id, source.name);
            }
        }
        Commands::Combine => {
            let count = combine::run(&dirs)?;
            log::info!("combine complete: {count} counties");
        }
        Commands::Fill => {
            let filled = fill::run(&dirs)?;
            log::info!("fill complete: {filled} counties received estimates");
        }
        Commands::Build => {
            let count = build::run(&dirs)?;
            log::info!("build complete: {count} county records");
        }
        Commands::Stats { path } => {
            let path = path.unwrap_or_else(|| dirs.output.join("dataset.json"));
            let dataset = county_compass_dataset::load(&path)?;
            let summary = stats::summarize(&dataset.counties);
            print_stats(&dataset.counties, &summary);
        }
        Commands::Validate { path } => {
            let path = path.unwrap_or_else(|| dirs.output.join("dataset.json"));
            match county_compass_dataset::load(&path) {
                Ok(dataset) => {
                    println!(
                        "OK: {} counties, version {}",
                        dataset.counties.len(),
                        dataset.version
                    );
                }
                Err(e) => {
                    eprintln!("INVALID: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn print_stats(counties: &[CountyRecord], summary: &StatisticsSummary) {
    println!("{} counties", counties.len());
    println!();
    println!(
        "{:<18} {:>14} {:>14} {:>14} {:>12}",
        "METRIC", "MIN", "MEDIAN", "MAX", "HALF STDEV"
    );
    for metric in Metric::all() {
        let metric_stats = summary.metric(*metric);
        let values: Vec<f64> = counties
            .iter()
            .map(|county| county.metric_value(*metric))
            .collect();
        println!(
            "{:<18} {:>14.2} {:>14.2} {:>14.2} {:>12.2}",
            metric.label(),
            metric_stats.min,
            stats::median(&values),
            metric_stats.max,
            metric_stats.half_stdev,
        );
    }
}
