//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the rewards engine has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) for efficient database indexing.
//!
//! `PostgreSQL` generates row UUIDs via `DEFAULT` expressions on insert.
//! The `new()` constructors here exist for cases where app-side generation
//! is needed (e.g. tests, seed data, ledger appends).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a learner (user of the application).
    UserId
}

define_id! {
    /// Unique identifier for an exercise in the catalog.
    ExerciseId
}

define_id! {
    /// Unique identifier for a lesson in the catalog.
    LessonId
}

define_id! {
    /// Unique identifier for a course module (a group of lessons and exercises).
    ModuleId
}

define_id! {
    /// Unique identifier for an activity ledger entry.
    ActivityEventId
}

define_id! {
    /// Unique identifier for an XP audit transaction.
    XpTransactionId
}

define_id! {
    /// Unique identifier for a daily challenge (one per calendar day).
    ChallengeId
}

define_id! {
    /// Unique identifier for a daily challenge attempt record.
    AttemptId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let user = UserId::new();
        let exercise = ExerciseId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(user.into_inner(), Uuid::nil());
        assert_ne!(exercise.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = UserId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<UserId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ChallengeId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
