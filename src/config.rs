use crate::anomaly;
use crate::normality;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Tool configuration.
///
/// Loaded from a TOML file and validated before use. Every key is optional.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub weather: WeatherConfig,
}

/// Analysis parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Rolling window length in samples.
    pub window: usize,
    /// Anomaly threshold as a multiple of the rolling standard deviation.
    pub anomaly_threshold: f64,
    /// Half-width of the live normal range in seasonal standard deviations.
    pub normal_range_k: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: 30,
            anomaly_threshold: anomaly::DEFAULT_THRESHOLD,
            normal_range_k: normality::DEFAULT_RANGE_K,
        }
    }
}

/// Live weather API parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub base_url: String,
    /// Unit system passed to the API (`metric` gives degrees Celsius).
    pub units: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5/weather".into(),
            units: "metric".into(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        check_num(analysis.window, 2..=3650).context("invalid rolling window")?;
        check_num(analysis.anomaly_threshold, 0.0..100.0)
            .context("invalid anomaly threshold")?;
        if analysis.anomaly_threshold <= 0.0 {
            bail!("anomaly threshold must be positive");
        }
        check_num(analysis.normal_range_k, 0.0..100.0).context("invalid normal range width")?;

        let weather = &self.weather;
        if !weather.base_url.starts_with("http://") && !weather.base_url.starts_with("https://") {
            bail!("weather base url must be http(s), but is {:?}", weather.base_url);
        }
        check_num(weather.timeout_secs, 1..=300).context("invalid weather timeout")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
