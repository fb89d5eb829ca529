//! Temperature series data types.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Calendar season (Northern-hemisphere convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    /// Map a calendar month (1-12) to its season.
    ///
    /// {12,1,2} winter, {3,4,5} spring, {6,7,8} summer, {9,10,11} autumn.
    /// Returns `None` for an out-of-range month.
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Autumn),
            _ => None,
        }
    }

    /// Season of the month a timestamp falls in.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        // chrono months are 1..=12
        match timestamp.month() {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Season {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" => Ok(Season::Autumn),
            other => bail!("unknown season {other:?}"),
        }
    }
}

/// A single historical temperature measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub city: String,
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub season: Season,
}

/// Time-ordered observations of exactly one city.
///
/// Construction sorts by timestamp, so every series seen by the analysis
/// code is ascending regardless of input order.
#[derive(Debug, Clone)]
pub struct Series {
    city: String,
    obs_vec: Vec<Observation>,
}

impl Series {
    /// Build a series for `city`, sorting the observations by timestamp.
    ///
    /// # Errors
    /// Returns an error if any observation belongs to a different city.
    pub fn new(city: impl Into<String>, mut obs_vec: Vec<Observation>) -> Result<Self> {
        let city = city.into();
        if let Some(obs) = obs_vec.iter().find(|obs| obs.city != city) {
            bail!("observation for {:?} in series of {city:?}", obs.city);
        }
        // Stable sort keeps input order among equal timestamps.
        obs_vec.sort_by_key(|obs| obs.timestamp);
        Ok(Self { city, obs_vec })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn observations(&self) -> &[Observation] {
        &self.obs_vec
    }

    pub fn len(&self) -> usize {
        self.obs_vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obs_vec.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.obs_vec.iter().map(|obs| obs.temperature).collect()
    }
}
