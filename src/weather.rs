//! Live weather API client.

use crate::config::WeatherConfig;
use crate::error::WeatherApiError;
use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Current temperature of a city and the local time it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveReading {
    pub city: String,
    pub temperature: f64,
    pub observed_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
}

/// HTTP client for the current-weather endpoint.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    units: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        config: &WeatherConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, WeatherApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            units: config.units.clone(),
            api_key: api_key.into(),
        })
    }

    /// Fetch the current temperature of `city`.
    pub async fn current(&self, city: &str) -> Result<LiveReading, WeatherApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;
        let observed_at = Local::now().naive_local();

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("weather request for {city:?} failed with {status}");
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherApiError::Unauthorized { message },
                StatusCode::NOT_FOUND => WeatherApiError::CityNotFound {
                    city: city.to_string(),
                },
                _ => WeatherApiError::Status {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: CurrentWeather = response.json().await?;
        let temperature = body
            .main
            .and_then(|main| main.temp)
            .ok_or(WeatherApiError::MissingField("main.temp"))?;

        Ok(LiveReading {
            city: city.to_string(),
            temperature,
            observed_at,
        })
    }

    /// Fetch every city one after another.
    pub async fn current_sequential(
        &self,
        cities: &[String],
    ) -> Vec<Result<LiveReading, WeatherApiError>> {
        let mut results = Vec::with_capacity(cities.len());
        for city in cities {
            results.push(self.current(city).await);
        }
        results
    }

    /// Fetch every city concurrently over the shared connection pool.
    ///
    /// Results are in the order of `cities`.
    pub async fn current_concurrent(
        &self,
        cities: &[String],
    ) -> Vec<Result<LiveReading, WeatherApiError>> {
        join_all(cities.iter().map(|city| self.current(city))).await
    }
}

/// Wall time of a sequential and a concurrent fetch of the same cities.
#[derive(Debug)]
pub struct FetchTimings {
    pub sequential: Duration,
    pub concurrent: Duration,
    pub failures: usize,
}

pub async fn compare_fetch_modes(client: &WeatherClient, cities: &[String]) -> FetchTimings {
    let start = Instant::now();
    let seq_results = client.current_sequential(cities).await;
    let sequential = start.elapsed();

    let start = Instant::now();
    let con_results = client.current_concurrent(cities).await;
    let concurrent = start.elapsed();

    let failures = seq_results
        .iter()
        .chain(&con_results)
        .filter(|result| result.is_err())
        .count();

    FetchTimings {
        sequential,
        concurrent,
        failures,
    }
}
