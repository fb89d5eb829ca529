use crate::model::{Observation, Season, Series};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

/// CSV row layout shared by reading and writing.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    city: String,
    timestamp: String,
    temperature: f64,
    season: String,
}

/// Historical observations partitioned into per-city series.
///
/// Cities keep the order in which they first appear in the input.
pub struct Dataset {
    series_vec: Vec<Series>,
}

impl Dataset {
    /// Load a [`Dataset`] from a CSV file with a header row.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let mut cities: Vec<String> = Vec::new();
        let mut obs_map: HashMap<String, Vec<Observation>> = HashMap::new();
        for (i_rec, record) in reader.deserialize::<Record>().enumerate() {
            // Line 1 is the header.
            let line = i_rec + 2;
            let record = record.with_context(|| format!("failed to read line {line}"))?;
            let obs = parse_record(record).with_context(|| format!("invalid line {line}"))?;
            if !obs_map.contains_key(&obs.city) {
                cities.push(obs.city.clone());
            }
            obs_map.entry(obs.city.clone()).or_default().push(obs);
        }

        let mut series_vec = Vec::with_capacity(cities.len());
        for city in cities {
            let obs_vec = obs_map.remove(&city).unwrap_or_default();
            let series = Series::new(city, obs_vec)?;
            log::debug!("{}: {} observations", series.city(), series.len());
            series_vec.push(series);
        }
        log::info!("loaded {} cities", series_vec.len());

        Ok(Self { series_vec })
    }

    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.series_vec.iter().map(|series| series.city())
    }

    pub fn all_series(&self) -> &[Series] {
        &self.series_vec
    }

    pub fn series(&self, city: &str) -> Result<&Series> {
        match self.series_vec.iter().find(|series| series.city() == city) {
            Some(series) => Ok(series),
            None => {
                let known: Vec<_> = self.cities().collect();
                bail!("no data for city {city:?} (available: {known:?})")
            }
        }
    }
}

fn parse_record(record: Record) -> Result<Observation> {
    let city = record.city.trim().to_string();
    if city.is_empty() {
        bail!("city must not be empty");
    }
    let timestamp = parse_timestamp(&record.timestamp)?;
    let season: Season = record.season.parse()?;
    if !record.temperature.is_finite() {
        bail!("temperature must be finite, but is {}", record.temperature);
    }
    Ok(Observation {
        city,
        timestamp,
        temperature: record.temperature,
        season,
    })
}

/// Parse a date or date-time in one of the accepted layouts.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(timestamp);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(timestamp) = date.and_hms_opt(0, 0, 0) {
            return Ok(timestamp);
        }
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Ok(timestamp.naive_utc());
    }
    bail!("unrecognized timestamp {s:?}")
}

/// Write observations as CSV in the input layout.
pub fn write_csv<P: AsRef<Path>>(file: P, obs_vec: &[Observation]) -> Result<()> {
    let file = file.as_ref();
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    for obs in obs_vec {
        let record = Record {
            city: obs.city.clone(),
            timestamp: obs.timestamp.format("%Y-%m-%d").to_string(),
            temperature: obs.temperature,
            season: obs.season.to_string(),
        };
        writer.serialize(record).context("failed to write record")?;
    }

    writer
        .into_inner()
        .context("failed to flush csv writer")?
        .flush()
        .context("failed to flush writer stream")?;

    Ok(())
}
