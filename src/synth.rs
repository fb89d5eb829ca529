//! Synthetic historical datasets for demos and tests.

use crate::model::{Observation, Season};
use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Normal;

/// Standard deviation of the daily noise around the seasonal baseline.
const NOISE_STD_DEV: f64 = 5.0;

/// Seasonal mean temperatures (winter, spring, summer, autumn).
const BASELINES: [(&str, [f64; 4]); 8] = [
    ("Berlin", [0.0, 10.0, 20.0, 11.0]),
    ("Cairo", [15.0, 25.0, 35.0, 25.0]),
    ("Dubai", [20.0, 30.0, 40.0, 30.0]),
    ("London", [5.0, 11.0, 18.0, 12.0]),
    ("Moscow", [-10.0, 5.0, 18.0, 8.0]),
    ("New York", [0.0, 10.0, 25.0, 15.0]),
    ("Paris", [4.0, 12.0, 20.0, 13.0]),
    ("Tokyo", [6.0, 15.0, 27.0, 18.0]),
];

pub fn known_cities() -> impl Iterator<Item = &'static str> {
    BASELINES.iter().map(|(city, _)| *city)
}

fn baseline(city: &str, season: Season) -> Option<f64> {
    let (_, means) = BASELINES.iter().find(|(name, _)| *name == city)?;
    let idx = Season::ALL.iter().position(|&s| s == season)?;
    Some(means[idx])
}

/// Create the random number generator, seeded when `seed` is given.
pub fn make_rng(seed: Option<u64>) -> Result<ChaCha12Rng> {
    match seed {
        Some(seed) => Ok(ChaCha12Rng::seed_from_u64(seed)),
        None => ChaCha12Rng::try_from_os_rng().context("failed to seed rng from os"),
    }
}

/// Generate one observation per city per day starting at `start`.
///
/// Temperatures are drawn from a normal distribution around the city's
/// baseline for the season of each day.
pub fn generate<R: Rng>(
    cities: &[String],
    start: NaiveDate,
    n_days: usize,
    rng: &mut R,
) -> Result<Vec<Observation>> {
    let noise = Normal::new(0.0, NOISE_STD_DEV).context("failed to build noise distribution")?;
    let midnight = start.and_hms_opt(0, 0, 0).context("invalid start date")?;

    let mut obs_vec = Vec::with_capacity(cities.len() * n_days);
    for city in cities {
        if baseline(city, Season::Winter).is_none() {
            let known: Vec<_> = known_cities().collect();
            bail!("no baseline for city {city:?} (known: {known:?})");
        }
        for i_day in 0..n_days {
            let timestamp = midnight + Duration::days(i_day as i64);
            let season = Season::of(&timestamp);
            let mean = baseline(city, season).unwrap_or_default();
            let temperature = mean + noise.sample(rng);
            obs_vec.push(Observation {
                city: city.clone(),
                timestamp,
                temperature,
                season,
            });
        }
    }

    log::info!(
        "generated {} observations for {} cities",
        obs_vec.len(),
        cities.len()
    );
    Ok(obs_vec)
}
