//! Human-readable duration strings ("1d", "12h", "90 minutes", "1.5 hours")
//!
//! A bare number is milliseconds. Units are case-insensitive and may be
//! separated from the number by spaces.

use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = SECOND_MS * 60.0;
const HOUR_MS: f64 = MINUTE_MS * 60.0;
const DAY_MS: f64 = HOUR_MS * 24.0;
const WEEK_MS: f64 = DAY_MS * 7.0;
const YEAR_MS: f64 = DAY_MS * 365.25;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)^(-?(?:\d+)?\.?\d+) *(milliseconds?|msecs?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y)?$",
        )
        .expect("duration pattern is valid")
    })
}

fn unit_millis(unit: &str) -> f64 {
    match unit {
        "years" | "year" | "yrs" | "yr" | "y" => YEAR_MS,
        "weeks" | "week" | "w" => WEEK_MS,
        "days" | "day" | "d" => DAY_MS,
        "hours" | "hour" | "hrs" | "hr" | "h" => HOUR_MS,
        "minutes" | "minute" | "mins" | "min" | "m" => MINUTE_MS,
        "seconds" | "second" | "secs" | "sec" | "s" => SECOND_MS,
        _ => 1.0,
    }
}

/// Parse a duration string into whole milliseconds.
///
/// Returns `None` when the string does not match the grammar or is longer
/// than 100 characters.
pub fn parse_millis(input: &str) -> Option<i64> {
    if input.is_empty() || input.len() > 100 {
        return None;
    }
    let caps = pattern().captures(input)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_else(|| "ms".to_string());

    let millis = (amount * unit_millis(&unit)).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(millis as i64)
}

/// Parse a duration string into a `chrono::Duration`.
pub fn parse_duration(input: &str) -> Option<Duration> {
    parse_millis(input).map(Duration::milliseconds)
}
