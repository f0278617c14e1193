use std::fmt;

use chrono::{DateTime, Offset, SecondsFormat, TimeDelta, TimeZone, Timelike, Utc};

pub const WINDOW_LENGTH_SECS: i64 = 60;

/// Half-open wall-clock minute `[start, end)` a scheduler tick is responsible for.
///
/// Boundaries depend only on the instant and the time zone, never on when the
/// previous tick ran, so ticks started late or retried land on the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DispatchWindow {
    /// Floors `now` to the start of its minute on the local clock of `tz`.
    pub fn resolve<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let offset = i64::from(
            tz.offset_from_utc_datetime(&now.naive_utc())
                .fix()
                .local_minus_utc(),
        );
        let now = now.with_nanosecond(0).expect("Will never fail.");
        let into_minute = (now.timestamp() + offset).rem_euclid(WINDOW_LENGTH_SECS);

        Self::starting_at(now - TimeDelta::seconds(into_minute))
    }

    fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + TimeDelta::seconds(WINDOW_LENGTH_SECS),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }

    pub fn next(&self) -> Self {
        Self::starting_at(self.end)
    }

    pub fn previous(&self) -> Self {
        Self::starting_at(self.start - TimeDelta::seconds(WINDOW_LENGTH_SECS))
    }
}

impl fmt::Display for DispatchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}
