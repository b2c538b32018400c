use once_cell::sync::Lazy;
use regex::Regex;

/// Digit run, optional whitespace, then a degree marker: "°" (covers "°C"),
/// "degree" or "degrees", case-insensitive. ASCII digits only; no sign.
///
/// OCR often reads the degree sign as the masculine ordinal "º" (U+00BA) or
/// the ring above "˚" (U+02DA); both count as "°".
static TEMPERATURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:[°º˚]|degrees?)").expect("temperature pattern is valid")
});

/// First temperature-like match found in OCR text
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureMatch {
    pub value: i32,
    /// Matched text, e.g. "25°"
    pub matched: String,
    /// Byte offset of the match in the input
    pub offset: usize,
}

/// Find the first digit run followed by a degree marker.
///
/// Only the first match in document order is considered. If its digit run
/// does not fit an `i32`, there is no result.
pub fn find_temperature(text: &str) -> Option<TemperatureMatch> {
    let captures = TEMPERATURE_PATTERN.captures(text)?;
    let whole = captures.get(0)?;
    let digits = captures.get(1)?.as_str();

    let value = parse_temperature_digits(digits)?;

    Some(TemperatureMatch {
        value,
        matched: whole.as_str().to_string(),
        offset: whole.start(),
    })
}

/// Extract the temperature from OCR text; `None` when nothing qualifies
pub fn extract_temperature(text: &str) -> Option<i32> {
    find_temperature(text).map(|m| m.value)
}

/// Parse a run of ASCII digits as a base-10 integer ("007" → 7)
pub fn parse_temperature_digits(digits: &str) -> Option<i32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
