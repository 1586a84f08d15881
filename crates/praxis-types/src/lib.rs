//! Shared type definitions for the Praxis rewards engine.
//!
//! This crate is the single source of truth for all types used across the
//! Praxis workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the web dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (action kinds, tiers, categories, difficulty)
//! - [`structs`] -- Core entity structs (ledger entries, XP, streaks, achievements, challenges)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AchievementCategory, AchievementTier, ActionKind, Difficulty};
pub use ids::{
    ActivityEventId, AttemptId, ChallengeId, ExerciseId, LessonId, ModuleId, UserId,
    XpTransactionId,
};
pub use structs::{
    AchievementDefinition, AchievementDelta, AchievementStatus, ActivityEvent, ChallengeOutcome,
    DailyChallenge, DailyChallengeAttempt, Exercise, ExerciseCompletion, ModuleCompletionOutcome,
    PointsOutcome, PointsSummary, StreakState, UserAchievement, UserCounters, XpAward, XpState,
    XpTransaction,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::ExerciseId::export_all();
        let _ = crate::ids::ChallengeId::export_all();

        // Enums
        let _ = crate::enums::ActionKind::export_all();
        let _ = crate::enums::AchievementTier::export_all();
        let _ = crate::enums::Difficulty::export_all();

        // Structs
        let _ = crate::structs::ActivityEvent::export_all();
        let _ = crate::structs::XpState::export_all();
        let _ = crate::structs::StreakState::export_all();
        let _ = crate::structs::AchievementStatus::export_all();
        let _ = crate::structs::DailyChallenge::export_all();
    }
}
