use crate::model::Series;
use crate::stats::RollingPoint;

pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Flag observations that deviate from their rolling baseline.
///
/// Index `i` is anomalous iff `rolling[i]` is defined and
/// `|temperature - mean| > threshold * std`. A zero std never flags, since
/// the comparison is strict.
pub fn detect(series: &Series, rolling: &[Option<RollingPoint>], threshold: f64) -> Vec<bool> {
    series
        .observations()
        .iter()
        .zip(rolling)
        .map(|(obs, point)| match point {
            Some(point) => (obs.temperature - point.mean).abs() > threshold * point.std_dev,
            None => false,
        })
        .collect()
}

/// Indices of the flagged positions of a mask.
pub fn flagged(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(idx, &flag)| flag.then_some(idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::daily_series;
    use crate::stats::rolling;

    fn run(temps: &[f64], window: usize) -> Vec<bool> {
        let series = daily_series(temps);
        let roll = rolling(&series.temperatures(), window);
        detect(&series, &roll, DEFAULT_THRESHOLD)
    }

    #[test]
    fn constant_series_has_no_anomalies() {
        assert!(run(&[12.5; 90], 30).iter().all(|&flag| !flag));
    }

    #[test]
    fn spike_is_flagged_once_window_fills() {
        let mut temps = vec![10.0; 29];
        temps.push(50.0);
        let mask = run(&temps, 30);
        assert_eq!(flagged(&mask), vec![29]);
    }

    #[test]
    fn spike_before_window_fill_is_not_flagged() {
        let mut temps = vec![10.0; 40];
        temps[5] = 80.0;
        let mask = run(&temps, 30);
        assert!(!mask[5]);
    }

    #[test]
    fn undefined_rolling_never_flags() {
        let temps: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { -40.0 } else { 40.0 }).collect();
        let mask = run(&temps, 30);
        assert!(mask[..29].iter().all(|&flag| !flag));
    }

    #[test]
    fn threshold_is_a_parameter() {
        let mut temps: Vec<f64> = (0..30).map(|i| (i % 3) as f64).collect();
        temps.push(4.0);
        let series = daily_series(&temps);
        let roll = rolling(&series.temperatures(), 30);
        let loose = detect(&series, &roll, 10.0);
        let strict = detect(&series, &roll, 1.0);
        assert!(!loose[30]);
        assert!(strict[30]);
    }
}
