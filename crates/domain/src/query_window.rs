use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Serialize;
use tripwire_core::{AppError, AppResult};

/// Strict format accepted for alarm reference times.
pub const REFERENCE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Half-open `[start, end)` search interval in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    start: i64,
    end: i64,
}

impl QueryWindow {
    /// Creates a validated window from explicit bounds.
    pub fn new(start: i64, end: i64) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::Validation(format!(
                "query window start ({start}) must be before end ({end})"
            )));
        }

        Ok(Self { start, end })
    }

    /// Creates the window of width `lookback` ending at `reference`.
    ///
    /// Both bounds derive from the single `reference` instant, rounded to the
    /// nearest whole second, so `end - start` always equals the lookback.
    pub fn ending_at(reference: DateTime<Utc>, lookback: TimeDelta) -> AppResult<Self> {
        let lookback_seconds = lookback.num_seconds();
        if lookback_seconds <= 0 {
            return Err(AppError::Validation(
                "query window lookback must be at least one second".to_owned(),
            ));
        }

        let end = reference
            .timestamp_millis()
            .saturating_add(500)
            .div_euclid(1_000);
        let start = end.checked_sub(lookback_seconds).ok_or_else(|| {
            AppError::Validation(format!(
                "query window lookback of {lookback_seconds}s underflows reference {end}"
            ))
        })?;

        Self::new(start, end)
    }

    /// Returns the inclusive start bound in epoch seconds.
    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Returns the exclusive end bound in epoch seconds.
    #[must_use]
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Returns the window width in seconds.
    #[must_use]
    pub fn width_seconds(&self) -> i64 {
        self.end - self.start
    }
}

/// Parses an alarm reference time in [`REFERENCE_TIME_FORMAT`].
pub fn parse_reference_time(value: &str) -> AppResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, REFERENCE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|error| {
            AppError::InvalidTimeFormat(format!(
                "'{value}' does not match {REFERENCE_TIME_FORMAT}: {error}"
            ))
        })
}
