use crate::anomaly;
use crate::config::AnalysisConfig;
use crate::model::{Season, Series};
use crate::profile::{self, SeasonProfile, SeasonRollProfile};
use crate::stats::{self, Accumulator};
use crate::trend::{self, TrendDirection, TrendResult};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::{
    fmt::{self, Write as _},
    fs::File,
    io::BufWriter,
    path::Path,
    time::{Duration, Instant},
};

/// Overall statistics of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// One observation with its rolling statistics and anomaly flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub season: Season,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub anomaly: bool,
    /// Trend line value anchored at the first observation.
    pub trend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendReport {
    pub slope: f64,
    pub slope_per_year: f64,
    pub direction: TrendDirection,
}

impl From<TrendResult> for TrendReport {
    fn from(trend: TrendResult) -> Self {
        Self {
            slope: trend.slope,
            slope_per_year: trend.slope_per_year(),
            direction: trend.direction(),
        }
    }
}

/// Everything computed for one city.
#[derive(Debug, Clone, Serialize)]
pub struct CityAnalysis {
    pub city: String,
    pub summary: Summary,
    pub rows: Vec<Row>,
    pub season_profile: SeasonProfile,
    pub season_roll_profile: SeasonRollProfile,
    pub anomalies: Vec<usize>,
    pub trend: TrendReport,
}

/// Run the full pipeline on one city's series.
pub fn analyze_city(series: &Series, cfg: &AnalysisConfig) -> CityAnalysis {
    let temps = series.temperatures();

    let rolling = stats::rolling(&temps, cfg.window);
    let mask = anomaly::detect(series, &rolling, cfg.anomaly_threshold);
    let season_profile = profile::by_season_raw(series);
    let season_roll_profile = profile::by_season_rolling(series, &rolling);
    let trend_fit = trend::fit(series);
    let trend_line = trend::trend_line(series, trend_fit.slope);

    let rows = series
        .observations()
        .iter()
        .zip(&rolling)
        .zip(&mask)
        .zip(trend_line)
        .map(|(((obs, point), &anomaly), trend)| Row {
            timestamp: obs.timestamp,
            temperature: obs.temperature,
            season: obs.season,
            rolling_mean: point.map(|p| p.mean),
            rolling_std: point.map(|p| p.std_dev),
            anomaly,
            trend,
        })
        .collect();

    for (season, season_stats) in &season_profile {
        if let Err(err) = season_stats.checked(*season) {
            log::warn!("{}: {err}", series.city());
        }
    }
    if let Err(err) = trend_fit.checked_slope() {
        log::warn!("{}: {err}", series.city());
    }

    CityAnalysis {
        city: series.city().to_string(),
        summary: summarize(&temps),
        rows,
        season_profile,
        season_roll_profile,
        anomalies: anomaly::flagged(&mask),
        trend: trend_fit.into(),
    }
}

fn summarize(temps: &[f64]) -> Summary {
    let mut acc = Accumulator::new();
    temps.iter().for_each(|&temp| acc.add(temp));
    let fold_or_nan = |init: f64, f: fn(f64, f64) -> f64| {
        if temps.is_empty() {
            f64::NAN
        } else {
            temps.iter().copied().fold(init, f)
        }
    };
    Summary {
        count: acc.n_vals(),
        mean: acc.report().mean,
        min: fold_or_nan(f64::INFINITY, f64::min),
        max: fold_or_nan(f64::NEG_INFINITY, f64::max),
    }
}

/// Analyze cities one after another.
///
/// Returns the results in input order and the elapsed wall time.
pub fn analyze_cities_sequential(
    series_vec: &[Series],
    cfg: &AnalysisConfig,
) -> (Vec<CityAnalysis>, Duration) {
    let start = Instant::now();
    let results = series_vec
        .iter()
        .map(|series| {
            log::info!("analyzing {}", series.city());
            analyze_city(series, cfg)
        })
        .collect();
    (results, start.elapsed())
}

/// Analyze cities on the blocking worker pool, one task per city.
///
/// Per-city analyses share no state; results are collected in input order.
pub async fn analyze_cities_parallel(
    series_vec: Vec<Series>,
    cfg: &AnalysisConfig,
) -> Result<(Vec<CityAnalysis>, Duration)> {
    let start = Instant::now();
    let handles: Vec<_> = series_vec
        .into_iter()
        .map(|series| {
            let cfg = cfg.clone();
            tokio::task::spawn_blocking(move || {
                log::info!("analyzing {}", series.city());
                analyze_city(&series, &cfg)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("analysis task failed")?);
    }
    Ok((results, start.elapsed()))
}

/// Write all analyses as pretty-printed JSON.
pub fn save_results<P: AsRef<Path>>(file: P, results: &[CityAnalysis]) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, results).context("failed to serialize results")?;
    Ok(())
}

/// One `season mean std` line per profile entry, values rounded to 2 decimals.
pub fn format_profile(profile: &SeasonProfile) -> String {
    let mut out = String::new();
    write_profile(&mut out, profile).ok();
    out
}

fn write_profile(out: &mut String, profile: &SeasonProfile) -> fmt::Result {
    for (season, season_stats) in profile {
        writeln!(out, "{:<8} {:>8.2} {:>8.2}", season, season_stats.mean, season_stats.std)?;
    }
    Ok(())
}

/// Plain-text report of one city.
pub fn format_report(analysis: &CityAnalysis) -> String {
    let mut out = String::new();
    write_report(&mut out, analysis).ok();
    out
}

fn write_report(out: &mut String, analysis: &CityAnalysis) -> fmt::Result {
    let summary = &analysis.summary;
    writeln!(out, "city: {}", analysis.city)?;
    writeln!(out, "observations: {}", summary.count)?;
    writeln!(out, "mean temperature: {:.2}°C", summary.mean)?;
    writeln!(out, "min temperature: {:.2}°C", summary.min)?;
    writeln!(out, "max temperature: {:.2}°C", summary.max)?;

    writeln!(out, "season profile:\n{:<8} {:>8} {:>8}", "season", "mean", "std")?;
    write_profile(out, &analysis.season_profile)?;

    writeln!(out, "rolling season profile:")?;
    for (season, roll) in &analysis.season_roll_profile {
        writeln!(
            out,
            "{:<8} {:>8.2} {:>8.2}",
            season, roll.mean_of_rolling_means, roll.std_of_rolling_means
        )?;
    }

    let trend = &analysis.trend;
    match trend.direction {
        TrendDirection::Warming | TrendDirection::Cooling => writeln!(
            out,
            "trend: {}, {:.5}°C/day or {:.2}°C/year",
            trend.direction, trend.slope, trend.slope_per_year
        )?,
        TrendDirection::Flat | TrendDirection::Undefined => {
            writeln!(out, "trend: {}", trend.direction)?
        }
    }

    if analysis.anomalies.is_empty() {
        writeln!(out, "anomalies: none")?;
    } else {
        writeln!(out, "anomalies: {}", analysis.anomalies.len())?;
        for &idx in &analysis.anomalies {
            let row = &analysis.rows[idx];
            writeln!(
                out,
                "  {} {:<8} {:>8.2}",
                row.timestamp.format("%Y-%m-%d"),
                row.season,
                row.temperature
            )?;
        }
    }
    Ok(())
}
