//! The consecutive-day streak state machine.
//!
//! Transitions are driven by the calendar day of a triggering event
//! (typically the once-per-session login event, so many actions in one day
//! cannot inflate the streak):
//!
//! - no prior record -> streak of 1
//! - same day as last activity -> no change (already counted today)
//! - exactly the next day -> current +1, longest raised if passed
//! - gap of more than one day -> current resets to 1, longest preserved
//! - earlier than last activity -> defensive no-op (backfill), not an error

use chrono::NaiveDate;

use praxis_types::{StreakState, UserId};

use crate::clock::is_next_day;

/// Apply an activity day to a user's streak state.
///
/// `state` is `None` when the user has no streak record yet. Always
/// returns the state to persist; callers may skip the write when the
/// returned state equals the input.
pub fn advance(state: Option<&StreakState>, user_id: UserId, day: NaiveDate) -> StreakState {
    let Some(prior) = state else {
        return StreakState {
            user_id,
            current_streak: 1,
            longest_streak: 1,
            last_activity_date: day,
        };
    };

    if day == prior.last_activity_date {
        return *prior;
    }

    if day < prior.last_activity_date {
        // Out-of-order event (backfill). Never rewind the streak.
        return *prior;
    }

    if is_next_day(prior.last_activity_date, day) {
        let current = prior.current_streak.saturating_add(1);
        return StreakState {
            user_id: prior.user_id,
            current_streak: current,
            longest_streak: prior.longest_streak.max(current),
            last_activity_date: day,
        };
    }

    // Gap of more than one day: the run restarts at 1, not 0, because the
    // triggering activity itself counts. The high-water mark survives.
    StreakState {
        user_id: prior.user_id,
        current_streak: 1,
        longest_streak: prior.longest_streak,
        last_activity_date: day,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn first_activity_starts_at_one() {
        let state = advance(None, UserId::new(), date(10));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert_eq!(state.last_activity_date, date(10));
    }

    #[test]
    fn three_consecutive_days_reach_three() {
        let user = UserId::new();
        let mut state = advance(None, user, date(10));
        state = advance(Some(&state), user, date(11));
        state = advance(Some(&state), user, date(12));
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.longest_streak, 3);
    }

    #[test]
    fn same_day_does_not_double_count() {
        let user = UserId::new();
        let mut state = advance(None, user, date(10));
        state = advance(Some(&state), user, date(11));
        let repeated = advance(Some(&state), user, date(11));
        assert_eq!(repeated, state);
    }

    #[test]
    fn gap_resets_to_one_and_preserves_longest() {
        let user = UserId::new();
        let mut state = advance(None, user, date(10));
        state = advance(Some(&state), user, date(11));
        state = advance(Some(&state), user, date(12));
        assert_eq!(state.longest_streak, 3);

        // Day 17 is five days later: the run restarts.
        state = advance(Some(&state), user, date(17));
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 3);
        assert_eq!(state.last_activity_date, date(17));
    }

    #[test]
    fn out_of_order_day_is_a_no_op() {
        let user = UserId::new();
        let mut state = advance(None, user, date(12));
        state = advance(Some(&state), user, date(13));
        let backfilled = advance(Some(&state), user, date(11));
        assert_eq!(backfilled, state);
    }

    #[test]
    fn longest_only_rises_when_current_passes_it() {
        let user = UserId::new();
        // Build a 3-day run, break it, rebuild 2 days.
        let mut state = advance(None, user, date(1));
        state = advance(Some(&state), user, date(2));
        state = advance(Some(&state), user, date(3));
        state = advance(Some(&state), user, date(10));
        state = advance(Some(&state), user, date(11));
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.longest_streak, 3);

        // Two more days pass the old high-water mark.
        state = advance(Some(&state), user, date(12));
        state = advance(Some(&state), user, date(13));
        assert_eq!(state.current_streak, 4);
        assert_eq!(state.longest_streak, 4);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let user = UserId::new();
        let aug31 = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        let sep1 = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let mut state = advance(None, user, aug31);
        state = advance(Some(&state), user, sep1);
        assert_eq!(state.current_streak, 2);
    }

    #[test]
    fn invariant_longest_at_least_current() {
        let user = UserId::new();
        let mut state = advance(None, user, date(1));
        for d in [2, 3, 8, 9, 10, 11, 20, 21] {
            state = advance(Some(&state), user, date(d));
            assert!(state.longest_streak >= state.current_streak);
        }
    }
}
