#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal explorer for the county dataset.
//!
//! Loads a built dataset and drives a `dialoguer` menu loop: apply a
//! preset or adjust per-metric filters, rank the closest matches, and
//! inspect individual counties. All computation is local; nothing here
//! talks to the network.

mod view;

use std::path::PathBuf;

use clap::Parser;
use county_compass_county_models::{CountyRecord, Metric};
use county_compass_scoring::{composite, preset, preset::CuratedPreset, rank, stats};
use county_compass_scoring_models::{FilterConfiguration, Importance, StatisticsSummary};
use dialoguer::{Confirm, Input, Select};

#[derive(Parser)]
#[command(name = "county-compass")]
#[command(about = "Interactive county dataset explorer", long_about = None)]
struct Cli {
    /// Path to the built dataset JSON file.
    #[arg(long, default_value = "data/final/dataset.json")]
    dataset: PathBuf,

    /// How many counties the top-matches table shows.
    #[arg(long, default_value_t = rank::DEFAULT_LIMIT)]
    limit: usize,
}

/// Top-level actions available in the explorer menu.
enum ExplorerAction {
    TopMatches,
    ApplyPreset,
    AdjustFilters,
    ShowFilters,
    ViewCounty,
    Quit,
}

impl ExplorerAction {
    const ALL: &[Self] = &[
        Self::TopMatches,
        Self::ApplyPreset,
        Self::AdjustFilters,
        Self::ShowFilters,
        Self::ViewCounty,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::TopMatches => "Show top matches",
            Self::ApplyPreset => "Apply a preset",
            Self::AdjustFilters => "Adjust filters",
            Self::ShowFilters => "Show current filters",
            Self::ViewCounty => "View a county",
            Self::Quit => "Quit",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let dataset = county_compass_dataset::load(&cli.dataset)?;
    let stats = stats::summarize(&dataset.counties);
    let mut config = FilterConfiguration::default();

    println!("County Compass");
    println!(
        "{} counties loaded (dataset {})",
        view::group_thousands(dataset.counties.len() as u64),
        &dataset.version.as_str()[..12],
    );
    println!();

    loop {
        let labels: Vec<&str> = ExplorerAction::ALL
            .iter()
            .map(ExplorerAction::label)
            .collect();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match ExplorerAction::ALL[idx] {
            ExplorerAction::TopMatches => {
                show_top_matches(&dataset.counties, &config, &stats, cli.limit);
            }
            ExplorerAction::ApplyPreset => apply_preset(&mut config, &dataset.counties, &stats)?,
            ExplorerAction::AdjustFilters => adjust_filters(&mut config, &stats)?,
            ExplorerAction::ShowFilters => print_filters(&config, &stats),
            ExplorerAction::ViewCounty => view_county(&dataset.counties, &stats)?,
            ExplorerAction::Quit => break,
        }
        println!();
    }

    Ok(())
}

/// Ranks and prints the closest matches for the current filters.
fn show_top_matches(
    counties: &[CountyRecord],
    config: &FilterConfiguration,
    stats: &StatisticsSummary,
    limit: usize,
) {
    let matches = rank::top_matches(counties, config, stats, limit);
    if matches.is_empty() {
        println!("No counties scored. Narrow a metric range first, or apply a preset.");
        return;
    }

    println!();
    println!(
        "{:>3}     {:<34} {:<20} {:>6} {:>6} {:>4}",
        "#", "COUNTY", "STATE", "SCORE", "MATCH", "COL"
    );
    println!("{}", "-".repeat(80));
    for (position, ranked) in matches.iter().enumerate() {
        println!(
            "{:>3}  {} {:<34} {:<20} {:>6.3} {:>5}% {:>4}",
            position + 1,
            view::swatch(Some(ranked.score)),
            ranked.county.name,
            ranked.county.state,
            ranked.score,
            ranked.match_percent(),
            composite::cost_of_living(&ranked.county, stats),
        );
    }
}

/// Prompts for a preset and replaces the current configuration with it.
fn apply_preset(
    config: &mut FilterConfiguration,
    counties: &[CountyRecord],
    stats: &StatisticsSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut labels = vec!["Median \u{2014} ranges centered on each metric's median".to_string()];
    for preset in CuratedPreset::all() {
        labels.push(format!("{} \u{2014} {}", preset.label(), preset.description()));
    }

    let idx = Select::new()
        .with_prompt("Which preset?")
        .items(&labels)
        .default(0)
        .interact()?;

    *config = if idx == 0 {
        preset::median_preset(counties, stats)
    } else {
        CuratedPreset::all()[idx - 1].configuration()
    };

    println!("Preset applied.");
    Ok(())
}

/// Walks the user through per-metric range and importance edits.
fn adjust_filters(
    config: &mut FilterConfiguration,
    stats: &StatisticsSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let mut labels: Vec<String> = Metric::all()
            .iter()
            .map(|metric| filter_summary(*metric, config, stats))
            .collect();
        labels.push("Done".to_string());

        let idx = Select::new()
            .with_prompt("Adjust which metric?")
            .items(&labels)
            .default(labels.len() - 1)
            .interact()?;

        if idx == Metric::all().len() {
            return Ok(());
        }

        let metric = Metric::all()[idx];
        let absolute = *stats.metric(metric);
        let filter = config.metric_mut(metric);

        filter.enabled = Confirm::new()
            .with_prompt(format!("Include {} in scoring?", metric.label()))
            .default(filter.enabled)
            .interact()?;
        if !filter.enabled {
            continue;
        }

        println!(
            "Dataset range: {} to {}",
            view::format_value(absolute.min, metric),
            view::format_value(absolute.max, metric),
        );
        filter.min = prompt_optional_f64("Minimum (empty for dataset minimum)")?;
        filter.max = prompt_optional_f64("Maximum (empty for dataset maximum)")?;

        let importance_str: String = Input::new()
            .with_prompt("Importance 1-5")
            .default(filter.importance.value().to_string())
            .interact_text()?;
        filter.importance =
            Importance::from_value_clamped(importance_str.trim().parse().unwrap_or(3));
    }
}

/// One menu line summarizing a metric's current filter state.
fn filter_summary(
    metric: Metric,
    config: &FilterConfiguration,
    stats: &StatisticsSummary,
) -> String {
    let filter = config.metric(metric);
    if !filter.enabled {
        return format!("{} \u{2014} off", metric.label());
    }
    let absolute = stats.metric(metric);
    if !filter.narrows_range(absolute) {
        return format!("{} \u{2014} no preference", metric.label());
    }
    let (min, max) = filter.resolved_range(absolute);
    format!(
        "{} \u{2014} {} to {}, importance {}",
        metric.label(),
        view::format_value(min, metric),
        view::format_value(max, metric),
        filter.importance.value(),
    )
}

/// Prints the full filter table with resolved ranges.
fn print_filters(config: &FilterConfiguration, stats: &StatisticsSummary) {
    println!();
    println!(
        "{:<18} {:<8} {:<11} {:>15} {:>15}",
        "METRIC", "ENABLED", "IMPORTANCE", "MIN", "MAX"
    );
    println!("{}", "-".repeat(72));
    for metric in Metric::all() {
        let filter = config.metric(*metric);
        let absolute = stats.metric(*metric);
        let (min, max) = filter.resolved_range(absolute);
        println!(
            "{:<18} {:<8} {:<11} {:>15} {:>15}",
            metric.label(),
            if filter.enabled { "yes" } else { "no" },
            filter.importance.value(),
            view::format_value(min, *metric),
            view::format_value(max, *metric),
        );
    }

    let narrowed = Metric::all()
        .iter()
        .filter(|metric| {
            let filter = config.metric(**metric);
            filter.enabled && filter.narrows_range(stats.metric(**metric))
        })
        .count();
    if narrowed == 0 {
        println!();
        println!("No enabled metric narrows its range, so every county is unscored.");
    }
}

/// Finds a county by FIPS or name fragment and prints its detail view.
fn view_county(
    counties: &[CountyRecord],
    stats: &StatisticsSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    let query: String = Input::new()
        .with_prompt("County name or FIPS")
        .interact_text()?;
    let trimmed = query.trim();
    let lowered = trimmed.to_ascii_lowercase();

    let found: Vec<&CountyRecord> = counties
        .iter()
        .filter(|county| {
            county.fips == trimmed || county.name.to_ascii_lowercase().contains(&lowered)
        })
        .collect();

    match found.as_slice() {
        [] => println!("No county matches {trimmed:?}."),
        [county] => print_county(county, stats),
        _ => {
            let labels: Vec<String> = found
                .iter()
                .map(|county| format!("{}, {}", county.name, county.state))
                .collect();
            let idx = Select::new()
                .with_prompt("Which county?")
                .items(&labels)
                .default(0)
                .max_length(15)
                .interact()?;
            print_county(found[idx], stats);
        }
    }

    Ok(())
}

/// Prints every metric group for one county, marking estimated values.
fn print_county(county: &CountyRecord, stats: &StatisticsSummary) {
    let mark = |estimated: bool| if estimated { " *" } else { "" };

    println!();
    println!("{}, {} (FIPS {})", county.name, county.state, county.fips);
    println!("{}", "-".repeat(50));
    println!(
        "{:<16}{}",
        "Population",
        view::format_value(county.metric_value(Metric::Population), Metric::Population),
    );
    println!(
        "{:<16}{}",
        "Median age",
        view::format_value(county.median_age, Metric::MedianAge),
    );
    println!(
        "{:<16}{}{}",
        "Avg temperature",
        view::format_value(county.temperature.avg_temp_f, Metric::Temperature),
        mark(county.temperature.is_estimated),
    );
    println!(
        "{:<16}{}{}",
        "Home value",
        view::format_value(county.metric_value(Metric::HomeValue), Metric::HomeValue),
        mark(county.housing.is_estimated),
    );
    if let Some(percent) = county.housing.percent_national_median {
        println!("{:<16}{percent:.0}% of the national median", "");
    }
    println!(
        "{:<16}{}{}",
        "Median rent",
        view::format_value(county.metric_value(Metric::MedianRent), Metric::MedianRent),
        mark(county.rent.is_estimated),
    );
    let sizes = &county.rent.sizes;
    println!(
        "{:<16}{} / {} / {} / {} / {} (eff/1br/2br/3br/4br)",
        "",
        view::group_thousands(sizes.efficiency),
        view::group_thousands(sizes.one_bedroom),
        view::group_thousands(sizes.two_bedroom),
        view::group_thousands(sizes.three_bedroom),
        view::group_thousands(sizes.four_bedroom),
    );
    println!(
        "{:<16}{} {:.1}% D / {:.1}% R{}",
        "2024 vote",
        view::party_label(county.votes.winner),
        county.votes.percentages.democrat,
        county.votes.percentages.republican,
        mark(county.votes.is_estimated),
    );
    println!(
        "{:<16}{} / 100",
        "Cost of living",
        composite::cost_of_living(county, stats),
    );
    if county.has_estimates() {
        println!();
        println!("* estimated value");
    }
}

/// Prompts the user for an optional numeric bound. Returns `None` if the
/// input is empty. Commas in amounts like `200,000` are accepted.
fn prompt_optional_f64(prompt: &str) -> Result<Option<f64>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().replace(',', "").parse()?))
    }
}
