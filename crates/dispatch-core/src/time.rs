//! Site-local timestamps and time windows.
//!
//! The API interprets every timestamp in the site's own timezone, so
//! windows are built from a site-local `NaiveDateTime` and never from UTC.

use chrono::{Duration, FixedOffset, Local, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::error::{DispatchError, Result};

// ---------------------------------------------------------------------------
// Precision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `YYYY-MM-DD HH:MM`
    Minute,
    /// `YYYY-MM-DD HH:MM:SS`
    Second,
}

impl Precision {
    pub fn pattern(self) -> &'static str {
        match self {
            Precision::Minute => "%Y-%m-%d %H:%M",
            Precision::Second => "%Y-%m-%d %H:%M:%S",
        }
    }

    pub fn format(self, at: NaiveDateTime) -> String {
        at.format(self.pattern()).to_string()
    }
}

// ---------------------------------------------------------------------------
// TimeWindow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(DispatchError::InvalidTimeWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(TimeWindow { start, end })
    }

    /// An 8-hour window starting 7 days before `now`.
    pub fn backdated_shift(now: NaiveDateTime) -> Self {
        let start = now - Duration::days(7);
        TimeWindow {
            start,
            end: start + Duration::hours(8),
        }
    }

    /// Reported 60 days before `now`, completed 34 minutes later.
    pub fn historical_dispatch(now: NaiveDateTime) -> Self {
        let start = now - Duration::days(60);
        TimeWindow {
            start,
            end: start + Duration::minutes(34),
        }
    }

    /// From midnight of `now`'s day to one day after `now`.
    pub fn daily_summary(now: NaiveDateTime) -> Self {
        TimeWindow {
            start: now.date().and_time(NaiveTime::MIN),
            end: now + Duration::days(1),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// `(start, end)` rendered at `precision`.
    pub fn format(&self, precision: Precision) -> (String, String) {
        (precision.format(self.start), precision.format(self.end))
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current site-local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Treats the host timezone as the site's timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Site timezone given as a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock(pub FixedOffset);

impl OffsetClock {
    /// Parse `+HH:MM` / `-HH:MM` (also `Z` for UTC).
    pub fn parse(offset: &str) -> Result<Self> {
        let offset = offset.trim();
        let normalized = if offset.eq_ignore_ascii_case("z") {
            "+00:00"
        } else {
            offset
        };
        normalized
            .parse::<FixedOffset>()
            .map(OffsetClock)
            .map_err(|e| DispatchError::Config(format!("invalid utc_offset '{offset}': {e}")))
    }
}

impl Clock for OffsetClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.0).naive_local()
    }
}
