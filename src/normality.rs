use crate::error::NormalityError;
use crate::model::Season;
use crate::profile::SeasonProfile;
use chrono::NaiveDateTime;

pub const DEFAULT_RANGE_K: f64 = 2.0;

/// Decide whether a live reading lies within the seasonal normal range.
///
/// The season comes from the month of `timestamp`. The range is
/// `[mean - k * std, mean + k * std]`, inclusive on both ends.
///
/// # Errors
/// Returns [`NormalityError::NoSeasonData`] when the profile has no entry for
/// the season, or the entry has an undefined mean or std.
pub fn is_normal(
    temperature: f64,
    timestamp: &NaiveDateTime,
    profile: &SeasonProfile,
    k: f64,
) -> Result<bool, NormalityError> {
    let season = Season::of(timestamp);
    let stats = profile
        .get(&season)
        .ok_or(NormalityError::NoSeasonData { season })?;
    let (mean, std) = stats
        .checked(season)
        .map_err(|_| NormalityError::NoSeasonData { season })?;

    let lower = mean - k * std;
    let upper = mean + k * std;
    Ok((lower..=upper).contains(&temperature))
}
