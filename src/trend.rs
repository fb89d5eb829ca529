use crate::error::InsufficientDataError;
use crate::model::Series;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear temperature trend in degrees per day.
///
/// `slope` is NaN when the series spans fewer than two distinct days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub slope: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Warming,
    Cooling,
    Flat,
    /// No fit: fewer than two distinct days.
    Undefined,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Warming => "warming",
            TrendDirection::Cooling => "cooling",
            TrendDirection::Flat => "flat",
            TrendDirection::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TrendResult {
    pub fn checked_slope(&self) -> Result<f64, InsufficientDataError> {
        if self.slope.is_nan() {
            return Err(InsufficientDataError {
                what: "trend fit".into(),
                needed: 2,
                have: 1,
            });
        }
        Ok(self.slope)
    }

    pub fn slope_per_year(&self) -> f64 {
        self.slope * 365.0
    }

    pub fn direction(&self) -> TrendDirection {
        if self.slope.is_nan() {
            TrendDirection::Undefined
        } else if self.slope > 0.0 {
            TrendDirection::Warming
        } else if self.slope < 0.0 {
            TrendDirection::Cooling
        } else {
            TrendDirection::Flat
        }
    }
}

/// Whole days elapsed since the earliest observation.
pub fn days_elapsed(series: &Series) -> Vec<i64> {
    let Some(start) = series.observations().iter().map(|obs| obs.timestamp).min() else {
        return Vec::new();
    };
    series
        .observations()
        .iter()
        .map(|obs| (obs.timestamp - start).num_days())
        .collect()
}

/// Fit `temperature = slope * days + intercept` by ordinary least squares.
///
/// Only the slope is returned.
pub fn fit(series: &Series) -> TrendResult {
    let xs: Vec<f64> = days_elapsed(series).into_iter().map(|d| d as f64).collect();
    let ys = series.temperatures();
    let slope = match linear_regression(&xs, &ys) {
        Some((slope, _intercept)) => slope,
        None => f64::NAN,
    };
    TrendResult { slope }
}

/// Returns `(slope, intercept)`, or `None` without two distinct x values.
fn linear_regression(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let cov_xy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let var_x: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if var_x == 0.0 {
        return None;
    }

    let slope = cov_xy / var_x;
    let intercept = mean_y - slope * mean_x;
    Some((slope, intercept))
}

/// Trend line anchored at the first observation's temperature.
///
/// Uses `first_temp + slope * days` rather than the fitted intercept, which
/// is how reports draw the line.
pub fn trend_line(series: &Series, slope: f64) -> Vec<f64> {
    let Some(first) = series.observations().first() else {
        return Vec::new();
    };
    series
        .observations()
        .iter()
        .map(|obs| first.temperature + slope * (obs.timestamp - first.timestamp).num_days() as f64)
        .collect()
}
