use std::sync::Arc;

use chrono::TimeDelta;
use tracing::info;
use tripwire_core::AppResult;
use tripwire_domain::{QueryWindow, parse_reference_time};

use crate::incident_ports::Clock;

/// Default width of the search window preceding the alarm.
pub const DEFAULT_LOOKBACK: TimeDelta = TimeDelta::minutes(10);

/// Derives the log search window for an alarm.
#[derive(Clone)]
pub struct WindowResolver {
    clock: Arc<dyn Clock>,
    lookback: TimeDelta,
}

impl WindowResolver {
    /// Creates a resolver with the given clock and lookback width.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, lookback: TimeDelta) -> Self {
        Self { clock, lookback }
    }

    /// Resolves the window ending at `reference_time`, or at the current
    /// instant when no reference is supplied.
    ///
    /// An empty string counts as absent. Any other value must match the strict
    /// reference format or the call fails with `InvalidTimeFormat`.
    pub fn resolve(&self, reference_time: Option<&str>) -> AppResult<QueryWindow> {
        let reference = match reference_time.filter(|value| !value.is_empty()) {
            Some(value) => parse_reference_time(value)?,
            None => self.clock.now(),
        };

        let window = QueryWindow::ending_at(reference, self.lookback)?;
        info!(
            reference = %reference,
            start = window.start(),
            end = window.end(),
            "resolved query window"
        );

        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use tripwire_core::AppError;

    use super::{DEFAULT_LOOKBACK, WindowResolver};
    use crate::incident_ports::Clock;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn resolver_at(epoch_seconds: i64) -> WindowResolver {
        let now = Utc
            .timestamp_opt(epoch_seconds, 0)
            .single()
            .unwrap_or_else(|| unreachable!());
        WindowResolver::new(Arc::new(FixedClock(now)), DEFAULT_LOOKBACK)
    }

    #[test]
    fn resolve_uses_clock_when_reference_is_absent() {
        let window = resolver_at(1_700_000_000).resolve(None);
        assert!(window.is_ok());
        let window = window.unwrap_or_else(|_| unreachable!());
        assert_eq!(window.end(), 1_700_000_000);
        assert_eq!(window.start(), 1_700_000_000 - 600);
    }

    #[test]
    fn resolve_treats_empty_reference_as_absent() {
        let window = resolver_at(1_000).resolve(Some(""));
        assert!(window.is_ok());
        assert_eq!(window.unwrap_or_else(|_| unreachable!()).end(), 1_000);
    }

    #[test]
    fn resolve_prefers_supplied_reference_time() {
        let resolver = WindowResolver::new(
            Arc::new(FixedClock(Utc::now())),
            TimeDelta::minutes(30),
        );
        let window = resolver.resolve(Some("2024-01-01T00:30:00Z"));
        assert!(window.is_ok());
        let window = window.unwrap_or_else(|_| unreachable!());
        assert_eq!(window.end(), 1_704_069_000);
        assert_eq!(window.width_seconds(), 1_800);
    }

    #[test]
    fn resolve_rejects_malformed_reference_without_falling_back() {
        let window = resolver_at(1_000).resolve(Some("2024-01-01 00:30"));
        assert!(matches!(window, Err(AppError::InvalidTimeFormat(_))));
    }
}
