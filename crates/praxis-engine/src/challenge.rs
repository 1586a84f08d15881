//! Daily challenge selection and scoring.
//!
//! The challenge for a date is a fixed-size set of exercises chosen
//! deterministically from the catalog. Determinism matters for
//! concurrency: two first-requests of the day racing to create the record
//! compute the same exercise set, so whichever insert wins, every caller
//! sees the same challenge. The unique constraint on the date settles the
//! insert race; the selection settles the content.
//!
//! Challenge answers are worth double the exercise's base points:
//! easy 5 -> 10, moderate 10 -> 20, hard 15 -> 30.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use praxis_types::{Difficulty, ExerciseId};

use crate::error::EngineError;

/// Number of exercises in every daily challenge.
pub const CHALLENGE_SIZE: usize = 3;

/// Seed derived from a calendar date.
///
/// Computed arithmetically from the proleptic-Gregorian day number, so
/// the value is identical across processes, deploys, and compiler
/// releases. The odd multiplier spreads consecutive dates across the
/// seed space.
fn seed_for_date(date: NaiveDate) -> u64 {
    u64::from(date.num_days_from_ce().unsigned_abs()).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Deterministically select the challenge exercises for a date.
///
/// The pool is sorted first so the result does not depend on the caller's
/// ordering, then a partial Fisher-Yates shuffle seeded by the date picks
/// [`CHALLENGE_SIZE`] entries.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when the pool holds fewer than
/// [`CHALLENGE_SIZE`] exercises.
pub fn select_exercises(
    date: NaiveDate,
    pool: &[ExerciseId],
) -> Result<Vec<ExerciseId>, EngineError> {
    if pool.len() < CHALLENGE_SIZE {
        return Err(EngineError::Validation(format!(
            "exercise pool has {} entries; a daily challenge needs {CHALLENGE_SIZE}",
            pool.len()
        )));
    }

    let mut candidates: Vec<ExerciseId> = pool.to_vec();
    candidates.sort_unstable();
    candidates.dedup();
    if candidates.len() < CHALLENGE_SIZE {
        return Err(EngineError::Validation(format!(
            "exercise pool has {} distinct entries; a daily challenge needs {CHALLENGE_SIZE}",
            candidates.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed_for_date(date));
    for slot in 0..CHALLENGE_SIZE {
        let pick = rng.random_range(slot..candidates.len());
        candidates.swap(slot, pick);
    }
    candidates.truncate(CHALLENGE_SIZE);
    Ok(candidates)
}

/// Points for a correct daily challenge answer: double the base value.
pub const fn doubled_points(difficulty: Difficulty) -> u32 {
    difficulty.base_points().saturating_mul(2)
}

/// Compare a submitted answer against the stored correct answer.
///
/// Comparison trims surrounding whitespace and ignores ASCII case so
/// `" Paris "` matches `"paris"`.
pub fn is_answer_correct(submitted: &str, correct: &str) -> bool {
    submitted.trim().eq_ignore_ascii_case(correct.trim())
}
