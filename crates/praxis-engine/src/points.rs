//! Points aggregation over the append-only activity ledger.
//!
//! The ledger is the source of truth: every sum the engine reports is
//! derived by filtering entries against calendar boundaries and summing,
//! never from a cached counter that could drift.

use chrono::NaiveDate;

use praxis_types::{ActionKind, ActivityEvent, PointsSummary};

use crate::clock::{month_start, week_start};

/// Aggregate a user's ledger entries into calendar-window sums.
///
/// `today` determines all three window boundaries: the current day, the
/// Monday of the current ISO week, and the first of the current month.
/// Entries dated after `today` (clock skew, backfill gone wrong) count
/// toward `all_time` only.
pub fn summarize(entries: &[ActivityEvent], today: NaiveDate) -> PointsSummary {
    let week = week_start(today);
    let month = month_start(today);

    let mut summary = PointsSummary {
        today: 0,
        this_week: 0,
        this_month: 0,
        all_time: 0,
    };

    for entry in entries {
        let day = entry.occurred_at.date_naive();
        let points = u64::from(entry.points);

        summary.all_time = summary.all_time.saturating_add(points);
        if day > today {
            continue;
        }
        if day == today {
            summary.today = summary.today.saturating_add(points);
        }
        if day >= week {
            summary.this_week = summary.this_week.saturating_add(points);
        }
        if day >= month {
            summary.this_month = summary.this_month.saturating_add(points);
        }
    }

    summary
}

/// Return whether a ledger slice already contains a daily-login entry on
/// the given calendar day.
///
/// The atomic dedup guard lives in the store; this predicate backs the
/// in-memory store and keeps the rule testable in isolation.
pub fn has_daily_login_on(entries: &[ActivityEvent], day: NaiveDate) -> bool {
    entries.iter().any(|entry| {
        entry.action_kind == ActionKind::DailyLogin && entry.occurred_at.date_naive() == day
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use praxis_types::{ActivityEventId, UserId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event_on(y: i32, m: u32, d: u32, kind: ActionKind, points: u32) -> ActivityEvent {
        ActivityEvent {
            id: ActivityEventId::new(),
            user_id: UserId::new(),
            action_kind: kind,
            points,
            related_id: None,
            occurred_at: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_ledger_sums_to_zero() {
        let summary = summarize(&[], date(2026, 8, 26));
        assert_eq!(summary.today, 0);
        assert_eq!(summary.this_week, 0);
        assert_eq!(summary.this_month, 0);
        assert_eq!(summary.all_time, 0);
    }

    #[test]
    fn windows_nest_correctly() {
        // Today is Wednesday 2026-08-26; week started Monday the 24th.
        let entries = vec![
            event_on(2026, 8, 26, ActionKind::LessonCompleted, 10), // today
            event_on(2026, 8, 24, ActionKind::VideoWatched, 5),     // this week
            event_on(2026, 8, 3, ActionKind::TaskCompleted, 20),    // this month
            event_on(2026, 7, 15, ActionKind::DailyLogin, 2),       // earlier
        ];
        let summary = summarize(&entries, date(2026, 8, 26));
        assert_eq!(summary.today, 10);
        assert_eq!(summary.this_week, 15);
        assert_eq!(summary.this_month, 35);
        assert_eq!(summary.all_time, 37);
    }

    #[test]
    fn week_boundary_uses_calendar_not_rolling_window() {
        // Today is Monday 2026-08-24. Sunday the 23rd is only one day ago
        // but belongs to the previous calendar week.
        let entries = vec![
            event_on(2026, 8, 23, ActionKind::LessonCompleted, 10),
            event_on(2026, 8, 24, ActionKind::LessonCompleted, 5),
        ];
        let summary = summarize(&entries, date(2026, 8, 24));
        assert_eq!(summary.this_week, 5);
        assert_eq!(summary.this_month, 15);
    }

    #[test]
    fn month_boundary_splits_adjacent_days() {
        // Today is 2026-09-01; 2026-08-31 was yesterday but last month.
        // It still counts toward the week, which began Monday 08-31.
        let entries = vec![
            event_on(2026, 8, 31, ActionKind::LessonCompleted, 10),
            event_on(2026, 9, 1, ActionKind::LessonCompleted, 5),
        ];
        let summary = summarize(&entries, date(2026, 9, 1));
        assert_eq!(summary.today, 5);
        assert_eq!(summary.this_week, 15);
        assert_eq!(summary.this_month, 5);
        assert_eq!(summary.all_time, 15);
    }

    #[test]
    fn future_entries_count_all_time_only() {
        let entries = vec![event_on(2026, 8, 27, ActionKind::LessonCompleted, 10)];
        let summary = summarize(&entries, date(2026, 8, 26));
        assert_eq!(summary.today, 0);
        assert_eq!(summary.this_week, 0);
        assert_eq!(summary.all_time, 10);
    }

    #[test]
    fn daily_login_lookup_matches_day_only() {
        let entries = vec![event_on(2026, 8, 26, ActionKind::DailyLogin, 2)];
        assert!(has_daily_login_on(&entries, date(2026, 8, 26)));
        assert!(!has_daily_login_on(&entries, date(2026, 8, 25)));

        let other = vec![event_on(2026, 8, 26, ActionKind::VideoWatched, 2)];
        assert!(!has_daily_login_on(&other, date(2026, 8, 26)));
    }
}
