//! Enumeration types for the Praxis rewards engine.
//!
//! All enumerations serialize in `snake_case` to match the wire contract
//! the web frontend consumes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Activity action kinds
// ---------------------------------------------------------------------------

/// The kind of point-earning learner activity recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// First login of a calendar day (at most one per user per day).
    DailyLogin,
    /// A video was watched to completion.
    VideoWatched,
    /// An exercise was completed (correct or not).
    ExerciseCompleted,
    /// A podcast episode was listened to.
    PodcastListened,
    /// A task from a lesson was completed.
    TaskCompleted,
    /// A daily challenge exercise was answered correctly.
    DailyChallengeCompleted,
    /// A lesson was completed.
    LessonCompleted,
}

// ---------------------------------------------------------------------------
// Achievement categories and tiers
// ---------------------------------------------------------------------------

/// The category an achievement belongs to.
///
/// The category determines which learner counter an achievement is
/// evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementCategory {
    /// Lessons completed.
    Learning,
    /// Consecutive-day activity (longest streak).
    Streak,
    /// Modules completed in full.
    Mastery,
    /// Exercises answered correctly.
    Practice,
}

/// Progressive achievement tier, lowest to highest.
///
/// The declaration order matters: tier evaluation scans this progression
/// to find the highest threshold met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AchievementTier {
    /// First tier, unlocked at the base requirement.
    Bronze,
    /// Second tier, at 2x the base requirement.
    Silver,
    /// Third tier, at 5x the base requirement.
    Gold,
    /// Final tier, at 10x the base requirement.
    Platinum,
}

impl AchievementTier {
    /// Return the display name for the tier.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }
}

// ---------------------------------------------------------------------------
// Exercise difficulty
// ---------------------------------------------------------------------------

/// Difficulty rating of a catalog exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// Introductory exercise.
    Easy,
    /// Intermediate exercise.
    Moderate,
    /// Advanced exercise.
    Hard,
}

impl Difficulty {
    /// Base points awarded for answering an exercise of this difficulty
    /// correctly outside a daily challenge. Daily challenge answers are
    /// worth double.
    #[must_use]
    pub const fn base_points(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Moderate => 10,
            Self::Hard => 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ActionKind::DailyLogin).ok();
        assert_eq!(json.as_deref(), Some("\"daily_login\""));
        let json = serde_json::to_string(&ActionKind::DailyChallengeCompleted).ok();
        assert_eq!(json.as_deref(), Some("\"daily_challenge_completed\""));
    }

    #[test]
    fn tier_ordering_follows_progression() {
        assert!(AchievementTier::Bronze < AchievementTier::Silver);
        assert!(AchievementTier::Silver < AchievementTier::Gold);
        assert!(AchievementTier::Gold < AchievementTier::Platinum);
    }

    #[test]
    fn difficulty_base_points() {
        assert_eq!(Difficulty::Easy.base_points(), 5);
        assert_eq!(Difficulty::Moderate.base_points(), 10);
        assert_eq!(Difficulty::Hard.base_points(), 15);
    }
}
