use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict of one comparison request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonResult {
    Match,
    NoMatch,
    Incomplete,
}

/// Why a comparison could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncompleteReason {
    NoTemperatureDetected,
    LookupFailed { city: String, error: String },
}

/// Everything the UI shows after pressing "Compare"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonReport {
    pub city: String,
    pub extracted_temperature: Option<i32>,
    pub api_temperature: Option<i32>,
    /// Unrounded reading from the weather service
    pub api_reading: Option<f64>,
    pub lookup_error: Option<String>,
    pub result: ComparisonResult,
    pub reason: Option<IncompleteReason>,
    pub message: String,
    pub compared_at: DateTime<Utc>,
}

impl ComparisonReport {
    pub fn is_match(&self) -> bool {
        self.result == ComparisonResult::Match
    }
}
