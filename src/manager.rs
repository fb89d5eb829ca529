use crate::analysis::{self, CityAnalysis};
use crate::config::Config;
use crate::data::{self, Dataset};
use crate::error::WeatherApiError;
use crate::model::Series;
use crate::normality;
use crate::synth;
use crate::weather::{self, WeatherClient};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Outcome of classifying a live reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveStatus {
    Normal,
    Anomalous,
}

pub struct Manager {
    cfg: Config,
}

impl Manager {
    pub fn new(config_file: Option<&Path>) -> Result<Self> {
        let cfg = match config_file {
            Some(file) => Config::from_file(file).context("failed to construct cfg")?,
            None => Config::default(),
        };
        log::info!("{cfg:#?}");

        Ok(Self { cfg })
    }

    pub fn generate_data(
        &self,
        output: &Path,
        cities: &[String],
        start: NaiveDate,
        years: usize,
        seed: Option<u64>,
    ) -> Result<()> {
        let mut rng = synth::make_rng(seed).context("failed to create rng")?;
        let obs_vec = synth::generate(cities, start, years * 365, &mut rng)
            .context("failed to generate observations")?;
        data::write_csv(output, &obs_vec).context("failed to write dataset")?;
        log::info!("wrote {output:?}");
        Ok(())
    }

    pub async fn analyze(
        &self,
        data_file: &Path,
        cities: &[String],
        output: Option<PathBuf>,
        parallel: bool,
    ) -> Result<Vec<CityAnalysis>> {
        let dataset = Dataset::from_file(data_file).context("failed to load dataset")?;
        let series_vec = select_series(&dataset, cities)?;

        let (results, elapsed) = if parallel {
            analysis::analyze_cities_parallel(series_vec, &self.cfg.analysis)
                .await
                .context("failed to analyze cities")?
        } else {
            analysis::analyze_cities_sequential(&series_vec, &self.cfg.analysis)
        };
        log::info!(
            "analyzed {} cities in {:.3}s ({})",
            results.len(),
            elapsed.as_secs_f64(),
            if parallel { "parallel" } else { "sequential" }
        );

        for result in &results {
            log::info!("report:\n{}", analysis::format_report(result));
        }

        if let Some(output) = output {
            analysis::save_results(&output, &results).context("failed to save results")?;
            log::info!("wrote {output:?}");
        }

        Ok(results)
    }

    pub async fn check_live(
        &self,
        data_file: &Path,
        city: &str,
        api_key: &str,
    ) -> Result<LiveStatus> {
        let dataset = Dataset::from_file(data_file).context("failed to load dataset")?;
        let series = dataset.series(city)?;
        let result = analysis::analyze_city(series, &self.cfg.analysis);

        let client = WeatherClient::new(&self.cfg.weather, api_key)
            .context("failed to construct weather client")?;
        let reading = match client.current(city).await {
            Ok(reading) => reading,
            Err(err) => {
                let hint = match &err {
                    WeatherApiError::Unauthorized { .. } => "check the API key",
                    WeatherApiError::CityNotFound { .. } => "check the city name",
                    _ => "weather service unavailable",
                };
                log::error!("{hint}");
                return Err(err).context("failed to fetch current weather");
            }
        };
        log::info!(
            "current temperature in {}: {:.2}°C at {}",
            reading.city,
            reading.temperature,
            reading.observed_at.format("%Y-%m-%d %H:%M")
        );

        let normal = normality::is_normal(
            reading.temperature,
            &reading.observed_at,
            &result.season_profile,
            self.cfg.analysis.normal_range_k,
        )
        .with_context(|| format!("failed to classify reading for {city}"))?;

        let status = if normal {
            LiveStatus::Normal
        } else {
            LiveStatus::Anomalous
        };
        log::info!(
            "current temperature ({:.2}°C) in {city} is {} for the season",
            reading.temperature,
            if normal { "normal" } else { "anomalous" }
        );
        Ok(status)
    }

    pub async fn compare_fetch(&self, cities: &[String], api_key: &str) -> Result<()> {
        let client = WeatherClient::new(&self.cfg.weather, api_key)
            .context("failed to construct weather client")?;
        let timings = weather::compare_fetch_modes(&client, cities).await;

        log::info!("sequential: {:.2}s", timings.sequential.as_secs_f64());
        log::info!("concurrent: {:.2}s", timings.concurrent.as_secs_f64());
        log::info!(
            "{} is faster",
            if timings.sequential < timings.concurrent {
                "sequential"
            } else {
                "concurrent"
            }
        );
        if timings.failures > 0 {
            log::warn!("{} requests failed", timings.failures);
        }
        Ok(())
    }
}

fn select_series(dataset: &Dataset, cities: &[String]) -> Result<Vec<Series>> {
    let series_vec: Vec<_> = if cities.is_empty() {
        dataset.all_series().to_vec()
    } else {
        cities
            .iter()
            .map(|city| dataset.series(city).cloned())
            .collect::<Result<_>>()?
    };
    if series_vec.is_empty() {
        bail!("dataset contains no cities");
    }
    if let Some(series) = series_vec.iter().find(|series| series.is_empty()) {
        bail!("no observations for city {:?}", series.city());
    }
    Ok(series_vec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalityError;
    use crate::model::{Observation, Season};
    use chrono::{Local, NaiveDate};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn manager_for(server: &MockServer) -> Manager {
        let mut cfg = Config::default();
        cfg.weather.base_url = format!("{}/data/2.5/weather", server.uri());
        Manager { cfg }
    }

    /// Two readings (0 and 100 degrees) per month, so every season has mean 50
    /// and a std wide enough to cover the whole 0..=100 range with k = 2.
    fn write_dataset(dir: &Path, skip: Option<Season>) -> PathBuf {
        let mut obs_vec = Vec::new();
        for month in 1..=12 {
            for (day, temperature) in [(1, 0.0), (2, 100.0)] {
                let timestamp = NaiveDate::from_ymd_opt(2020, month, day)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap();
                let season = Season::of(&timestamp);
                if Some(season) == skip {
                    continue;
                }
                obs_vec.push(Observation {
                    city: "Berlin".into(),
                    timestamp,
                    temperature,
                    season,
                });
            }
        }
        let path = dir.join("data.csv");
        data::write_csv(&path, &obs_vec).unwrap();
        path
    }

    async fn mount_reading(server: &MockServer, temp: f64) {
        Mock::given(method("GET"))
            .and(query_param("q", "Berlin"))
            .and(query_param("appid", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "main": { "temp": temp } })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn reading_within_range_is_normal() {
        let server = MockServer::start().await;
        mount_reading(&server, 50.0).await;
        let dir = tempfile::tempdir().unwrap();
        let data_file = write_dataset(dir.path(), None);

        let status = manager_for(&server)
            .check_live(&data_file, "Berlin", "secret")
            .await
            .unwrap();
        assert_eq!(status, LiveStatus::Normal);
    }

    #[tokio::test]
    async fn reading_outside_range_is_anomalous() {
        let server = MockServer::start().await;
        mount_reading(&server, 500.0).await;
        let dir = tempfile::tempdir().unwrap();
        let data_file = write_dataset(dir.path(), None);

        let status = manager_for(&server)
            .check_live(&data_file, "Berlin", "secret")
            .await
            .unwrap();
        assert_eq!(status, LiveStatus::Anomalous);
    }

    #[tokio::test]
    async fn unauthorized_error_is_kept_in_chain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let data_file = write_dataset(dir.path(), None);

        let err = manager_for(&server)
            .check_live(&data_file, "Berlin", "secret")
            .await
            .unwrap_err();
        assert!(
            err.chain().any(|cause| matches!(
                cause.downcast_ref::<WeatherApiError>(),
                Some(WeatherApiError::Unauthorized { .. })
            )),
            "{err:#}"
        );
    }

    #[tokio::test]
    async fn missing_current_season_is_reported() {
        let server = MockServer::start().await;
        mount_reading(&server, 50.0).await;
        let season = Season::of(&Local::now().naive_local());
        let dir = tempfile::tempdir().unwrap();
        let data_file = write_dataset(dir.path(), Some(season));

        let err = manager_for(&server)
            .check_live(&data_file, "Berlin", "secret")
            .await
            .unwrap_err();
        assert!(
            err.chain().any(|cause| cause.downcast_ref::<NormalityError>()
                == Some(&NormalityError::NoSeasonData { season })),
            "{err:#}"
        );
    }

    #[tokio::test]
    async fn unknown_city_fails_before_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let data_file = write_dataset(dir.path(), None);

        let err = manager_for(&server)
            .check_live(&data_file, "Atlantis", "secret")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Atlantis"), "{err:#}");
    }
}
