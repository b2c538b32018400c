use chrono::Utc;

use crate::error::WeatherError;
use crate::models::comparison::{ComparisonReport, ComparisonResult, IncompleteReason};
use crate::services::weather::WeatherReading;

pub const MATCH_MESSAGE: &str = "Match! Extracted temperature matches API data.";
pub const NO_MATCH_MESSAGE: &str = "Not Match! Extracted temperature does not match API data.";
pub const NO_TEMPERATURE_MESSAGE: &str = "No temperature was detected in the image.";

/// Compare the extracted and fetched temperatures.
///
/// Absence on either side gives `Incomplete` before any equality check.
pub fn compare(extracted: Option<i32>, api: Option<i32>) -> ComparisonResult {
    match (extracted, api) {
        (Some(image), Some(api)) if image == api => ComparisonResult::Match,
        (Some(_), Some(_)) => ComparisonResult::NoMatch,
        _ => ComparisonResult::Incomplete,
    }
}

/// Build the user-facing report from the extracted value and the lookup outcome
pub fn build_report(
    city: &str,
    extracted: Option<i32>,
    lookup: Result<WeatherReading, WeatherError>,
) -> ComparisonReport {
    let (api_reading, lookup_error) = match lookup {
        Ok(reading) => (Some(reading), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let api_temperature = api_reading.as_ref().map(|r| r.rounded);
    let result = compare(extracted, api_temperature);

    let reason = match (extracted, &lookup_error) {
        (None, _) => Some(IncompleteReason::NoTemperatureDetected),
        (Some(_), Some(error)) => Some(IncompleteReason::LookupFailed {
            city: city.to_string(),
            error: error.clone(),
        }),
        (Some(_), None) => None,
    };

    let message = match (&reason, &lookup_error) {
        (Some(IncompleteReason::NoTemperatureDetected), Some(error)) => format!(
            "{} The weather lookup for {} also failed: {}",
            NO_TEMPERATURE_MESSAGE, city, error
        ),
        (Some(IncompleteReason::NoTemperatureDetected), None) => NO_TEMPERATURE_MESSAGE.to_string(),
        (Some(IncompleteReason::LookupFailed { error, .. }), _) => {
            format!("Could not get the current temperature for {}: {}", city, error)
        }
        (None, _) if result == ComparisonResult::Match => MATCH_MESSAGE.to_string(),
        (None, _) => NO_MATCH_MESSAGE.to_string(),
    };

    ComparisonReport {
        city: city.to_string(),
        extracted_temperature: extracted,
        api_temperature,
        api_reading: api_reading.map(|r| r.temperature),
        lookup_error,
        result,
        reason,
        message,
        compared_at: Utc::now(),
    }
}
