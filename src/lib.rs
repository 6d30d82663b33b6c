//! Team Match Service
//!
//! This library computes schedule compatibility between students and
//! exposes it as a small web service. Given per-day availability it can
//! score two students against each other, rank teammate candidates for a
//! student and suggest meeting slots for a formed team.
//!
//! # Modules
//!
//! - `models`: time slots, profiles and the result structures returned to callers
//! - `services::matcher`: the scoring engine and the `Matcher` facade
//! - `services::store`: the `ProfileStore` abstraction and its backends
//! - `handlers` / `routes`: the axum HTTP surface
//!
//! # Scoring
//!
//! All scoring runs over a fixed canonical slot grid (`SlotGrid`). Exact grid
//! matches earn full credit, overlapping custom slots earn half credit, and
//! team slots are bucketed by attendance percentage.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


// Re-export the main API types for ease of use
pub use config::AppConfig;
pub use error::{MatchError, StoreError};
pub use handlers::api::AppState;
pub use models::profile::Profile;
pub use models::slot::{SlotGrid, TimeSlot, Weekday};
pub use routes::create_router;
pub use services::matcher::Matcher;
pub use services::store::ProfileStore;
