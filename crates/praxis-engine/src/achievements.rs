//! Achievement catalog and tier evaluation.
//!
//! Two responsibilities: cataloging (read-only definitions with a stable
//! order) and per-user unlock evaluation. Eligibility is always recomputed
//! from the source-of-truth counters ([`UserCounters`]), never from a
//! cached flag, and tiers are recomputed as "highest threshold met" rather
//! than incremented -- a counter jumping from 5 to 120 in one update can
//! land directly on platinum.
//!
//! Tiered achievements use a fixed multiplier table over the definition's
//! base requirement: bronze x1, silver x2, gold x5, platinum x10.

use std::sync::LazyLock;

use praxis_types::{
    AchievementCategory, AchievementDefinition, AchievementStatus, AchievementTier, UserAchievement,
    UserCounters,
};

/// Ordered (tier, multiplier) pairs, lowest tier first.
///
/// Kept as an explicit list so "find highest tier met" is a linear scan
/// over the progression.
pub const TIER_MULTIPLIERS: [(AchievementTier, u64); 4] = [
    (AchievementTier::Bronze, 1),
    (AchievementTier::Silver, 2),
    (AchievementTier::Gold, 5),
    (AchievementTier::Platinum, 10),
];

/// The static achievement catalog, ordered by the `order` field.
static CATALOG: LazyLock<Vec<AchievementDefinition>> = LazyLock::new(|| {
    let defs = [
        (
            "first_lesson",
            "First Steps",
            "Complete your first lesson",
            AchievementCategory::Learning,
            1,
            false,
        ),
        (
            "lesson_learner",
            "Lesson Learner",
            "Complete lessons across the curriculum",
            AchievementCategory::Learning,
            10,
            true,
        ),
        (
            "first_exercise",
            "Warming Up",
            "Answer your first exercise correctly",
            AchievementCategory::Practice,
            1,
            false,
        ),
        (
            "sharp_shooter",
            "Sharp Shooter",
            "Answer exercises correctly",
            AchievementCategory::Practice,
            20,
            true,
        ),
        (
            "daily_devotion",
            "Daily Devotion",
            "Keep a consecutive-day learning streak",
            AchievementCategory::Streak,
            3,
            true,
        ),
        (
            "week_warrior",
            "Week Warrior",
            "Stay active seven days in a row",
            AchievementCategory::Streak,
            7,
            false,
        ),
        (
            "module_master",
            "Module Master",
            "Complete every exercise in a module",
            AchievementCategory::Mastery,
            1,
            true,
        ),
        (
            "completionist",
            "Completionist",
            "Master five full modules",
            AchievementCategory::Mastery,
            5,
            false,
        ),
    ];

    defs.into_iter()
        .enumerate()
        .map(
            |(i, (key, title, description, category, base_requirement, has_levels))| {
                AchievementDefinition {
                    key: key.to_owned(),
                    title: title.to_owned(),
                    description: description.to_owned(),
                    category,
                    base_requirement,
                    has_levels,
                    order: u32::try_from(i).unwrap_or(u32::MAX),
                }
            },
        )
        .collect()
});

/// Return the full catalog in stable order.
pub fn catalog() -> &'static [AchievementDefinition] {
    &CATALOG
}

/// Look up a definition by catalog key.
pub fn definition(key: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|def| def.key == key)
}

/// Select the counter a category evaluates against.
pub const fn counter_for(category: AchievementCategory, counters: &UserCounters) -> u64 {
    match category {
        AchievementCategory::Learning => counters.lessons_completed,
        AchievementCategory::Practice => counters.exercises_correct,
        // The longest streak, not the current one, so eligibility is
        // monotone like every other counter.
        AchievementCategory::Streak => counters.longest_streak,
        AchievementCategory::Mastery => counters.modules_completed,
    }
}

/// Find the highest tier whose threshold the counter meets, if any.
pub fn highest_tier_met(base_requirement: u64, counter: u64) -> Option<AchievementTier> {
    let mut met = None;
    for (tier, multiplier) in TIER_MULTIPLIERS {
        if counter >= base_requirement.saturating_mul(multiplier) {
            met = Some(tier);
        } else {
            break;
        }
    }
    met
}

/// A pending unlock or upgrade produced by [`evaluate`], to be persisted
/// by the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierChange {
    /// The definition being unlocked or upgraded.
    pub definition: &'static AchievementDefinition,
    /// The tier the user now qualifies for.
    pub tier: AchievementTier,
    /// `true` when no unlock record exists yet.
    pub first_unlock: bool,
}

/// Compare the counters against every definition and the user's existing
/// unlock records, returning the changes to persist.
///
/// Untiered achievements unlock at bronze and never upgrade. A stored
/// tier above the computed one should be impossible given the monotonic
/// counters; if observed it is logged and the stored value kept.
pub fn evaluate(counters: &UserCounters, existing: &[UserAchievement]) -> Vec<TierChange> {
    let mut changes = Vec::new();

    for def in catalog() {
        let counter = counter_for(def.category, counters);
        let Some(met) = highest_tier_met(def.base_requirement, counter) else {
            continue;
        };
        let tier = if def.has_levels {
            met
        } else {
            AchievementTier::Bronze
        };

        match existing.iter().find(|ua| ua.key == def.key) {
            None => changes.push(TierChange {
                definition: def,
                tier,
                first_unlock: true,
            }),
            Some(held) if held.tier < tier => changes.push(TierChange {
                definition: def,
                tier,
                first_unlock: false,
            }),
            Some(held) if held.tier > tier => {
                tracing::warn!(
                    key = def.key,
                    stored = held.tier.display_name(),
                    computed = tier.display_name(),
                    "computed achievement tier below stored tier; keeping stored value"
                );
            }
            Some(_) => {}
        }
    }

    changes
}

/// Annotate every definition with the user's computed unlock status.
pub fn status(counters: &UserCounters, existing: &[UserAchievement]) -> Vec<AchievementStatus> {
    catalog()
        .iter()
        .map(|def| {
            let counter = counter_for(def.category, counters);
            let met = highest_tier_met(def.base_requirement, counter);
            let record = existing.iter().find(|ua| ua.key == def.key);
            AchievementStatus {
                definition: def.clone(),
                unlocked: met.is_some(),
                tier: if def.has_levels { met } else { None },
                unlocked_at: record.map(|ua| ua.unlocked_at),
            }
        })
        .collect()
}
