//! Clock injection and calendar boundary math.
//!
//! The clock is the single source of temporal truth for the engine. Every
//! operation that needs "now" or "today" receives it through the [`Clock`]
//! trait rather than reading the system clock inline, so tests can
//! simulate day rollover deterministically.
//!
//! Calendar boundaries use calendar semantics, not rolling windows: a week
//! starts on Monday (ISO 8601) and a month on its first day.

use std::sync::RwLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// Source of the current instant and calendar day.
pub trait Clock: Send + Sync {
    /// Return the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Return the current calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock reading the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and local development.
///
/// Interior mutability lets a test advance the day mid-scenario while the
/// service under test holds a shared reference.
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Create a clock pinned to the given instant.
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Pin the clock to a new instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self
            .instant
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = instant;
    }

    /// Advance the clock by a whole number of days.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self
            .instant
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = guard
            .checked_add_signed(chrono::Duration::days(days))
            .unwrap_or(*guard);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .instant
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Return the Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// Return the first day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Return whether `next` is exactly the calendar day after `prev`.
pub fn is_next_day(prev: NaiveDate, next: NaiveDate) -> bool {
    prev.succ_opt() == Some(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-08-26 is a Wednesday; the week began Monday the 24th.
        assert_eq!(week_start(date(2026, 8, 26)), date(2026, 8, 24));
        // A Monday is its own week start.
        assert_eq!(week_start(date(2026, 8, 24)), date(2026, 8, 24));
        // A Sunday belongs to the week that began six days earlier.
        assert_eq!(week_start(date(2026, 8, 30)), date(2026, 8, 24));
    }

    #[test]
    fn week_start_crosses_month_boundary() {
        // 2026-09-01 is a Tuesday; its week began Monday 2026-08-31.
        assert_eq!(week_start(date(2026, 9, 1)), date(2026, 8, 31));
    }

    #[test]
    fn month_start_is_first_day() {
        assert_eq!(month_start(date(2026, 8, 26)), date(2026, 8, 1));
        assert_eq!(month_start(date(2026, 8, 1)), date(2026, 8, 1));
    }

    #[test]
    fn is_next_day_detects_adjacency() {
        assert!(is_next_day(date(2026, 8, 25), date(2026, 8, 26)));
        assert!(is_next_day(date(2026, 8, 31), date(2026, 9, 1)));
        assert!(!is_next_day(date(2026, 8, 25), date(2026, 8, 27)));
        assert!(!is_next_day(date(2026, 8, 26), date(2026, 8, 25)));
    }

    #[test]
    fn fixed_clock_advances() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.today(), date(2026, 8, 26));

        clock.advance_days(1);
        assert_eq!(clock.today(), date(2026, 8, 27));

        clock.advance_days(6);
        assert_eq!(clock.today(), date(2026, 9, 2));
    }

    #[test]
    fn system_clock_tracks_real_time() {
        let clock = SystemClock;
        let before = Utc::now();
        let now = clock.now();
        assert!(now >= before);
    }
}
