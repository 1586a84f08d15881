//! `PostgreSQL` data layer for the Praxis progression engine.
//!
//! Implements the engine's [`RewardsStore`] and [`Catalog`] traits over
//! a single `PostgreSQL` database. The activity ledger and XP audit
//! trail are append-only; derived state (XP, streaks, achievements,
//! completion markers) lives in upserted rows guarded by uniqueness
//! constraints so concurrent check-then-act sequences stay exactly-once.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration, and migrations.
//! - [`rewards_store`] -- [`PgRewardsStore`], the persistence trait
//!   implementation.
//! - [`catalog_store`] -- [`PgCatalog`], read-only exercise and module
//!   lookups plus seeding helpers.
//! - [`error`] -- Shared error types.
//!
//! [`RewardsStore`]: praxis_engine::store::RewardsStore
//! [`Catalog`]: praxis_engine::store::Catalog
//! [`PgRewardsStore`]: rewards_store::PgRewardsStore
//! [`PgCatalog`]: catalog_store::PgCatalog

pub mod catalog_store;
pub mod error;
pub mod postgres;
pub mod rewards_store;

// Re-export primary types for convenience.
pub use catalog_store::PgCatalog;
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use rewards_store::PgRewardsStore;
