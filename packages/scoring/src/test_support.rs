//! Shared fixtures for the in-crate tests.

use county_compass_county_models::{
    CountyRecord, Housing, Party, Rent, RentSizes, Temperature, VotePercentages, VoteTotals, Votes,
};

/// Builds a county with the five scored metrics set explicitly and the
/// remaining fields at plausible constants.
pub fn county(
    fips: &str,
    population: u64,
    median_age: f64,
    avg_temp_f: f64,
    home_value: u64,
    median_rent: u64,
) -> CountyRecord {
    CountyRecord {
        fips: fips.to_string(),
        name: format!("County {fips}"),
        state: "Alabama".to_string(),
        population,
        median_age,
        temperature: Temperature {
            avg_temp_f,
            is_estimated: false,
        },
        votes: Votes {
            totals: VoteTotals {
                democrat: 4_000,
                republican: 6_000,
                total: 10_000,
            },
            percentages: VotePercentages {
                democrat: 40.0,
                republican: 60.0,
            },
            winner: Party::Republican,
            is_estimated: false,
        },
        housing: Housing {
            median_home_value: home_value,
            percent_national_median: None,
            is_estimated: false,
        },
        rent: Rent {
            median_rent,
            sizes: RentSizes {
                efficiency: 700,
                one_bedroom: 800,
                two_bedroom: 950,
                three_bedroom: 1_200,
                four_bedroom: 1_400,
            },
            is_estimated: false,
        },
    }
}

/// Builds a dataset whose populations take the given values, with every
/// other metric held constant.
pub fn population_dataset(populations: &[u64]) -> Vec<CountyRecord> {
    populations
        .iter()
        .enumerate()
        .map(|(index, population)| {
            county(&format!("{index:05}"), *population, 38.0, 60.0, 150_000, 900)
        })
        .collect()
}
