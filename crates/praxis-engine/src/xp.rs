//! Experience points and the level curve.
//!
//! The level is a pure function of cumulative XP -- it is recomputed from
//! `total_xp` on every grant rather than incremented blindly, so granting
//! 500 XP in one call and in five calls of 100 produces identical state.
//!
//! # Level curve
//!
//! Linear growth: finishing level `L` costs `100 x L` XP, so the
//! cumulative XP required to reach level `L + 1` is `50 x L x (L + 1)`.
//! Level 1 starts at 0 XP and needs 100 XP; level 2 needs a further 200;
//! and so on. The curve is monotonic and `total_xp` never regresses.

use praxis_types::{UserId, XpState};

/// XP required to finish level 1.
pub const BASE_XP_PER_LEVEL: u64 = 100;

/// XP required to finish the given level and reach the next.
pub fn xp_to_finish_level(level: u32) -> u64 {
    u64::from(level).saturating_mul(BASE_XP_PER_LEVEL)
}

/// Cumulative XP required to have reached the level after `level`.
///
/// Closed form of summing [`xp_to_finish_level`] from 1 to `level`:
/// `50 x level x (level + 1)`.
pub fn cumulative_threshold(level: u32) -> u64 {
    let l = u64::from(level);
    l.saturating_mul(l.saturating_add(1)).saturating_mul(50)
}

/// The level implied by a cumulative XP total.
///
/// Walks the thresholds upward; a fresh account (0 XP) is level 1.
pub fn level_for_xp(total_xp: u64) -> u32 {
    let mut level: u32 = 1;
    while total_xp >= cumulative_threshold(level) {
        level = level.saturating_add(1);
    }
    level
}

/// XP remaining until the next level for a given total.
pub fn xp_to_next_level(total_xp: u64, level: u32) -> u64 {
    cumulative_threshold(level).saturating_sub(total_xp)
}

/// Fresh XP state for a user with no grants yet.
pub fn initial_state(user_id: UserId) -> XpState {
    XpState {
        user_id,
        total_xp: 0,
        level: 1,
        xp_to_next_level: BASE_XP_PER_LEVEL,
    }
}

/// Apply an XP grant to a state, returning the new state and every level
/// newly reached (ascending, possibly empty, possibly more than one for a
/// large grant).
pub fn apply_grant(state: &XpState, amount: u64) -> (XpState, Vec<u32>) {
    let total_xp = state.total_xp.saturating_add(amount);

    let mut level = state.level;
    let mut levels_gained = Vec::new();
    while total_xp >= cumulative_threshold(level) {
        level = level.saturating_add(1);
        levels_gained.push(level);
    }

    let next = XpState {
        user_id: state.user_id,
        total_xp,
        level,
        xp_to_next_level: xp_to_next_level(total_xp, level),
    };
    (next, levels_gained)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_starts_at_one_hundred() {
        assert_eq!(xp_to_finish_level(1), 100);
        assert_eq!(xp_to_finish_level(2), 200);
        assert_eq!(cumulative_threshold(1), 100);
        assert_eq!(cumulative_threshold(2), 300);
        assert_eq!(cumulative_threshold(3), 600);
    }

    #[test]
    fn fresh_state_is_level_one() {
        let state = initial_state(UserId::new());
        assert_eq!(state.level, 1);
        assert_eq!(state.total_xp, 0);
        assert_eq!(state.xp_to_next_level, 100);
    }

    #[test]
    fn single_level_up_at_threshold() {
        // 95 XP, then +20 -> 115: exactly one level gained.
        let mut state = initial_state(UserId::new());
        let (next, gained) = apply_grant(&state, 95);
        assert_eq!(next.level, 1);
        assert_eq!(next.xp_to_next_level, 5);
        assert!(gained.is_empty());
        state = next;

        let (next, gained) = apply_grant(&state, 20);
        assert_eq!(next.total_xp, 115);
        assert_eq!(next.level, 2);
        assert_eq!(gained, vec![2]);
        assert_eq!(next.xp_to_next_level, 300 - 115);
    }

    #[test]
    fn large_grant_spans_multiple_levels() {
        let state = initial_state(UserId::new());
        // 600 XP reaches the level-4 threshold exactly.
        let (next, gained) = apply_grant(&state, 600);
        assert_eq!(next.level, 4);
        assert_eq!(gained, vec![2, 3, 4]);
        assert_eq!(next.xp_to_next_level, cumulative_threshold(4) - 600);
    }

    #[test]
    fn batching_is_equivalent_to_one_big_grant() {
        let user = UserId::new();
        let (bulk, _) = apply_grant(&initial_state(user), 750);

        let mut split = initial_state(user);
        for _ in 0..15 {
            let (next, _) = apply_grant(&split, 50);
            split = next;
        }
        assert_eq!(bulk, split);
    }

    #[test]
    fn zero_grant_changes_nothing() {
        let state = initial_state(UserId::new());
        let (next, gained) = apply_grant(&state, 0);
        assert_eq!(next, state);
        assert!(gained.is_empty());
    }

    #[test]
    fn level_is_monotonic_in_total_xp() {
        let mut previous = 0;
        for total in (0..5000).step_by(37) {
            let level = level_for_xp(total);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn level_for_xp_agrees_with_apply_grant() {
        for amount in [0, 99, 100, 299, 300, 599, 600, 10_000] {
            let (state, _) = apply_grant(&initial_state(UserId::new()), amount);
            assert_eq!(state.level, level_for_xp(amount));
        }
    }
}
