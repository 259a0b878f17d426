//! Wall-clock helpers and request timing
//!
//! Venues stamp their payloads in seconds, milliseconds or fractional
//! seconds; the conversions here turn all of them into `DateTime<Utc>`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch
#[inline]
pub fn nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Milliseconds since the Unix epoch
#[inline]
pub fn millis() -> u64 {
    nanos() / 1_000_000
}

pub fn datetime_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

pub fn datetime_from_secs(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Fractional seconds, as Kraken reports trade times
pub fn datetime_from_secs_f64(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
    Utc.timestamp_opt(whole, nanos.min(999_999_999)).single()
}

/// Parse RFC 3339 or the zone-less `YYYY-MM-DD[T ]HH:MM:SS[.fff]` forms
/// several venues use, treating zone-less values as UTC
pub fn parse_utc_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Measures a single API call and logs it when dropped
pub struct PerfTimer {
    start: u64,
    name: String,
    enabled: bool,
}

impl PerfTimer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: nanos(),
            name: name.into(),
            enabled: true,
        }
    }

    /// A timer that never logs, for clients built with timing disabled
    pub fn disabled() -> Self {
        Self {
            start: 0,
            name: String::new(),
            enabled: false,
        }
    }

    pub fn elapsed_micros(&self) -> u64 {
        nanos().saturating_sub(self.start) / 1_000
    }

    pub fn log_elapsed(&self) {
        if !self.enabled {
            return;
        }
        let micros = self.elapsed_micros();
        if micros < 1000 {
            tracing::debug!("{} took {}μs", self.name, micros);
        } else {
            tracing::debug!("{} took {:.3}ms", self.name, micros as f64 / 1000.0);
        }
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        self.log_elapsed();
    }
}
