//! Error types that callers branch on.

use crate::model::Season;
use thiserror::Error;

/// An aggregate could not be computed from the available data.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("insufficient data for {what}: need at least {needed}, have {have}")]
pub struct InsufficientDataError {
    pub what: String,
    pub needed: usize,
    pub have: usize,
}

/// Live normality check failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalityError {
    /// The historical profile has no usable entry for the current season.
    #[error("no historical data for season {season}")]
    NoSeasonData { season: Season },
}

/// Weather API failures, split by the categories the report distinguishes.
#[derive(Debug, Error)]
pub enum WeatherApiError {
    /// HTTP 401: missing or invalid API key.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// HTTP 404: the API does not know the city.
    #[error("city not found: {city}")]
    CityNotFound { city: String },

    /// Any other non-success status.
    #[error("weather API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// Success response without a temperature.
    #[error("response is missing field {0}")]
    MissingField(&'static str),
}
