//! Per-season aggregates of a temperature series.

use crate::error::InsufficientDataError;
use crate::model::{Season, Series};
use crate::stats::{Accumulator, AccumulatorReport, RollingPoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean and sample standard deviation of one season.
///
/// `std` is NaN when the season has a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub mean: f64,
    pub std: f64,
}

impl SeasonStats {
    /// Returns `(mean, std)` or an error if either is undefined.
    pub fn checked(&self, season: Season) -> Result<(f64, f64), InsufficientDataError> {
        if self.mean.is_nan() || self.std.is_nan() {
            return Err(InsufficientDataError {
                what: format!("{season} profile"),
                needed: 2,
                have: usize::from(!self.mean.is_nan()),
            });
        }
        Ok((self.mean, self.std))
    }
}

impl From<AccumulatorReport> for SeasonStats {
    fn from(report: AccumulatorReport) -> Self {
        Self {
            mean: report.mean,
            std: report.std_dev,
        }
    }
}

/// Raw temperature profile: one entry per season present in the series.
pub type SeasonProfile = BTreeMap<Season, SeasonStats>;

/// Profile of the rolling-window series restricted to one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonRollStats {
    pub mean_of_rolling_means: f64,
    pub std_of_rolling_means: f64,
    pub mean_of_rolling_stds: f64,
    pub std_of_rolling_stds: f64,
}

pub type SeasonRollProfile = BTreeMap<Season, SeasonRollStats>;

/// Group observations by season and aggregate their temperatures.
///
/// Seasons need not be contiguous; every observation tagged with a season
/// contributes to it. Seasons absent from the series have no entry.
pub fn by_season_raw(series: &Series) -> SeasonProfile {
    let mut acc_map: BTreeMap<Season, Accumulator> = BTreeMap::new();
    for obs in series.observations() {
        acc_map
            .entry(obs.season)
            .or_insert_with(Accumulator::new)
            .add(obs.temperature);
    }
    acc_map
        .into_iter()
        .map(|(season, acc)| (season, acc.report().into()))
        .collect()
}

/// Aggregate the rolling series per season.
///
/// `rolling` must be computed over the whole series (windows cross season
/// boundaries). Positions where the window has not filled are skipped;
/// seasons with no filled position have no entry.
pub fn by_season_rolling(series: &Series, rolling: &[Option<RollingPoint>]) -> SeasonRollProfile {
    let mut acc_map: BTreeMap<Season, (Accumulator, Accumulator)> = BTreeMap::new();
    for (obs, point) in series.observations().iter().zip(rolling) {
        let Some(point) = point else { continue };
        let (mean_acc, std_acc) = acc_map
            .entry(obs.season)
            .or_insert_with(|| (Accumulator::new(), Accumulator::new()));
        mean_acc.add(point.mean);
        std_acc.add(point.std_dev);
    }
    acc_map
        .into_iter()
        .map(|(season, (mean_acc, std_acc))| {
            let means = mean_acc.report();
            let stds = std_acc.report();
            let stats = SeasonRollStats {
                mean_of_rolling_means: means.mean,
                std_of_rolling_means: means.std_dev,
                mean_of_rolling_stds: stds.mean,
                std_of_rolling_stds: stds.std_dev,
            };
            (season, stats)
        })
        .collect()
}
