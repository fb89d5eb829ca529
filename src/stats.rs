use serde::{Deserialize, Serialize};

/// Streaming mean and sample variance (Welford's method).
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

/// Mean and sample standard deviation of a group of values.
///
/// `std_dev` is NaN for fewer than two values, `mean` is NaN for none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn n_vals(&self) -> usize {
        self.n_vals
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Rolling statistics at one position of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub mean: f64,
    pub std_dev: f64,
}

/// Trailing fixed-window mean and sample standard deviation.
///
/// The result is aligned index-for-index with `vals`. Positions where fewer
/// than `window` values are available (i + 1 < window) are `None`. Each
/// window is recomputed from its own slice, so there is no drift between
/// positions.
pub fn rolling(vals: &[f64], window: usize) -> Vec<Option<RollingPoint>> {
    if window == 0 {
        return vec![None; vals.len()];
    }
    (0..vals.len())
        .map(|idx| {
            if idx + 1 < window {
                return None;
            }
            let slice = &vals[idx + 1 - window..=idx];
            Some(RollingPoint {
                mean: compute_mean(slice),
                std_dev: compute_var(slice).sqrt(),
            })
        })
        .collect()
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

/// Sample variance (n - 1 denominator).
pub fn compute_var(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}
