//! Core progression and rewards logic for the Praxis platform.
//!
//! Everything a learner earns flows through this crate: activity points,
//! XP and levels, daily streaks, tiered achievements, the deterministic
//! daily challenge, and module completion bonuses. The append-only
//! activity ledger is the source of truth for points; levels, streaks,
//! and achievement tiers are derived state recomputed from it and from
//! the completion records.
//!
//! # Modules
//!
//! - [`points`] -- Calendar-window summation over the activity ledger.
//! - [`xp`] -- The linear level curve and XP grant application.
//! - [`streak`] -- Consecutive-day streak advancement rules.
//! - [`achievements`] -- The static catalog, tier thresholds, and
//!   counter evaluation.
//! - [`challenge`] -- Date-seeded deterministic exercise selection and
//!   answer scoring.
//! - [`modules`] -- Module completion detection and the one-time bonus.
//! - [`store`] -- The [`RewardsStore`] and [`Catalog`] persistence traits.
//! - [`memory`] -- In-memory store and catalog for tests and local runs.
//! - [`service`] -- [`RewardsService`], the orchestrator behind every
//!   API operation.
//! - [`clock`] -- Injectable time source so date-sensitive rules are
//!   testable.
//!
//! The domain modules ([`points`], [`xp`], [`streak`], [`achievements`],
//! [`challenge`], [`modules`]) are pure functions over plain data; all
//! I/O lives behind the [`store`] traits and is driven by the
//! [`service`].
//!
//! [`RewardsStore`]: store::RewardsStore
//! [`Catalog`]: store::Catalog
//! [`RewardsService`]: service::RewardsService

pub mod achievements;
pub mod challenge;
pub mod clock;
pub mod error;
pub mod memory;
pub mod modules;
pub mod points;
pub mod service;
pub mod store;
pub mod streak;
pub mod xp;

// Re-export primary types at crate root.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::EngineError;
pub use memory::{MemoryCatalog, MemoryStore};
pub use service::{CompletionRecorded, RewardsService};
pub use store::{AttemptInsert, Catalog, InsertOutcome, RewardsStore};
