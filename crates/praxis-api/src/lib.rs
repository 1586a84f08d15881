//! Rewards API server (Axum HTTP) for the Praxis learning platform.
//!
//! Exposes the progression engine over REST: points, XP, streaks,
//! achievements, the daily challenge, and module completion. Everything
//! in this crate is transport plumbing; the rules live in
//! `praxis-engine` and persistence in `praxis-db`.
//!
//! # Modules
//!
//! - [`config`] -- Environment-variable configuration.
//! - [`error`] -- [`ApiError`] and its HTTP status mapping.
//! - [`state`] -- Shared [`AppState`] injected into handlers.
//! - [`handlers`] -- Request/response DTOs and endpoint handlers.
//! - [`router`] -- Route table and middleware assembly.
//! - [`server`] -- TCP bind and serve lifecycle.
//!
//! [`ApiError`]: error::ApiError
//! [`AppState`]: state::AppState

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use config::ApiConfig;
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, start_server};
pub use state::AppState;
